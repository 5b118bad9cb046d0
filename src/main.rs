//! Headless trainer: evolves cars for a number of generations and reports
//! per-generation statistics.
//!
//! Usage:
//!   cargo run --release -- --generations 30 --seed 7
//!   RUST_LOG=roadevo=debug cargo run -- --params params.json --history-out history.json

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use roadevo::simulation::manager::{Phase, SimulationManager};
use roadevo::simulation::params::Params;

const DEFAULT_TICK_LIMIT: u64 = 5_000;

#[derive(Parser)]
#[command(name = "roadevo")]
#[command(about = "Evolve neural drivers that dodge scrolling obstacles")]
struct Args {
    /// Number of generations to complete
    #[arg(long, default_value_t = 20)]
    generations: u32,

    /// Seed for the simulation's random generator
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// JSON file with simulation parameters (missing fields use defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Cars per generation
    #[arg(long)]
    population: Option<usize>,

    /// Elites carried over unchanged
    #[arg(long)]
    elites: Option<usize>,

    /// Number of moving obstacles
    #[arg(long)]
    obstacles: Option<usize>,

    /// Per-weight mutation probability
    #[arg(long)]
    mutation_rate: Option<f32>,

    /// Ticks after which a generation is cut short (default 5000 unless the
    /// params file sets one)
    #[arg(long)]
    tick_limit: Option<u64>,

    /// Write the generation history as JSON to this file
    #[arg(long)]
    history_out: Option<PathBuf>,
}

impl Args {
    fn load_params(&self) -> Result<Params> {
        let mut params = match &self.params {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read params: {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("failed to parse params: {}", path.display()))?
            }
            None => Params::default(),
        };

        if let Some(population) = self.population {
            params.population_size = population;
        }
        if let Some(elites) = self.elites {
            params.elite_count = elites;
        }
        if let Some(obstacles) = self.obstacles {
            params.obstacle_count = obstacles;
        }
        if let Some(rate) = self.mutation_rate {
            params.mutation_rate = rate;
            params.min_mutation_rate = params.min_mutation_rate.min(rate);
        }
        if self.tick_limit.is_some() {
            params.generation_tick_limit = self.tick_limit;
        }
        // a perfect driver would otherwise never end its generation
        if params.generation_tick_limit.is_none() {
            params.generation_tick_limit = Some(DEFAULT_TICK_LIMIT);
        }
        // no observer needs the pause between generations
        params.generation_delay_ticks = 0;
        Ok(params)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let params = args.load_params()?;

    let mut manager =
        SimulationManager::seeded(params, args.seed).context("invalid simulation parameters")?;
    manager.start();

    println!("Starting evolution: {} generations, seed {}", args.generations, args.seed);

    let mut reported = 0;
    while manager.history().len() < args.generations as usize {
        manager.tick();

        if manager.phase() == Phase::Idle {
            bail!("simulation stopped unexpectedly");
        }

        for summary in &manager.history()[reported..] {
            println!(
                "gen {:>4}  best {:>9.1}  avg {:>9.1}  distance {:>8.0}  diversity {:>6.3}",
                summary.generation,
                summary.best_fitness,
                summary.average_fitness,
                summary.distance_traveled,
                summary.diversity
            );
        }
        reported = manager.history().len();
    }

    if let Some(path) = &args.history_out {
        let json = serde_json::to_string_pretty(manager.history())?;
        fs::write(path, json)
            .with_context(|| format!("failed to write history: {}", path.display()))?;
        println!("History written to {}", path.display());
    }

    Ok(())
}
