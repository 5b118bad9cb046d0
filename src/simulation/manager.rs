//! Generation loop: per-tick simulation, extinction detection and reproduction.
//!
//! The manager owns the population and the world. Each tick it advances the
//! obstacles, then updates every living car against the advanced world in
//! parallel. When the last car dies it schedules a delayed `Evolve` event;
//! while that event is pending no physics runs. When it fires the population
//! is ranked, elites are carried over unchanged, the remaining slots are
//! filled with mutated (and possibly recombined) offspring, and the world is
//! reset to its initial layout.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::brain::NeuralNetwork;
use super::car::{Car, CarView};
use super::error::SimError;
use super::memory::MemoryQueue;
use super::params::Params;
use super::stats::GenerationSummary;
use super::timer::{Scheduler, TimerHandle};
use super::world::World;

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No population exists yet.
    Idle,
    /// A generation is being simulated.
    Running,
    /// Every car is dead and reproduction is scheduled.
    GenerationEnding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineEvent {
    Evolve,
}

/// Settings that may change before the first generation or between generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Number of moving obstacles.
    pub obstacle_count: usize,
    /// Number of cars per generation.
    pub population_size: usize,
    /// Number of elites carried over unchanged.
    pub elite_count: usize,
    /// Per-value mutation probability.
    pub mutation_rate: f32,
    /// Mutation step size; unchanged when `None`.
    pub mutation_amplitude: Option<f32>,
}

/// Owns the population and the world and drives evolution.
#[derive(Debug)]
pub struct SimulationManager<R = Pcg32> {
    params: Params,
    rng: R,
    world: World,
    cars: Vec<Car>,
    memory: MemoryQueue,
    scheduler: Scheduler<EngineEvent>,
    pending_evolution: Option<TimerHandle>,
    phase: Phase,
    paused: bool,
    generation: u32,
    generation_ticks: u64,
    distance_traveled: f32,
    best_fitness: f32,
    history: Vec<GenerationSummary>,
}

impl SimulationManager<Pcg32> {
    /// Creates a manager with a seeded default generator.
    pub fn seeded(params: Params, seed: u64) -> Result<Self, SimError> {
        Self::new(params, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulationManager<R> {
    /// Creates an idle manager. The obstacle layout seed is drawn from `rng`.
    pub fn new(params: Params, mut rng: R) -> Result<Self, SimError> {
        params.validate()?;
        let world = World::new(&params, rng.random())?;
        Ok(Self::assemble(params, world, rng))
    }

    /// Creates an idle manager around an existing world.
    pub fn with_world(params: Params, world: World, rng: R) -> Result<Self, SimError> {
        params.validate()?;
        Ok(Self::assemble(params, world, rng))
    }

    fn assemble(params: Params, world: World, rng: R) -> Self {
        Self {
            memory: MemoryQueue::new(params.memory_capacity),
            params,
            rng,
            world,
            cars: Vec::new(),
            scheduler: Scheduler::new(),
            pending_evolution: None,
            phase: Phase::Idle,
            paused: false,
            generation: 0,
            generation_ticks: 0,
            distance_traveled: 0.0,
            best_fitness: 0.0,
            history: Vec::new(),
        }
    }

    /// Spawns the first generation if needed and unpauses.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.cars = (0..self.params.population_size)
                .map(|_| Car::spawn(&self.params, 1, &mut self.rng))
                .collect();
            self.generation = 1;
            self.generation_ticks = 0;
            self.distance_traveled = 0.0;
            self.best_fitness = 0.0;
            self.phase = Phase::Running;
            info!(
                population = self.cars.len(),
                "spawned initial population"
            );
        }
        self.paused = false;
    }

    /// Suspends ticking; the pending generation transition is suspended too.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Drops the population and history and returns to [`Phase::Idle`].
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.scheduler.clear();
        self.pending_evolution = None;
        self.cars.clear();
        self.memory.clear();
        self.history.clear();
        self.phase = Phase::Idle;
        self.paused = false;
        self.generation = 0;
        self.generation_ticks = 0;
        self.distance_traveled = 0.0;
        self.best_fitness = 0.0;
        self.world.reset()
    }

    /// Applies new counts and mutation settings.
    ///
    /// Only allowed before the first generation or while a generation is
    /// ending; changes take effect with the next population. On error the
    /// engine is left unchanged.
    pub fn configure(&mut self, config: Configuration) -> Result<(), SimError> {
        if self.phase == Phase::Running {
            return Err(SimError::AlreadyRunning);
        }

        let mut params = self.params.clone();
        params.obstacle_count = config.obstacle_count;
        params.population_size = config.population_size;
        params.elite_count = config.elite_count;
        params.mutation_rate = config.mutation_rate;
        params.min_mutation_rate = params.min_mutation_rate.min(config.mutation_rate);
        if let Some(amplitude) = config.mutation_amplitude {
            params.mutation_amplitude = amplitude;
        }
        params.validate()?;

        if params.obstacle_count != self.params.obstacle_count {
            let mut world = self.world.clone();
            world.reconfigure(&params)?;
            self.world = world;
        }
        debug!(?config, "configuration applied");
        self.params = params;
        Ok(())
    }

    /// Advances the simulation by one step.
    ///
    /// Does nothing while paused or idle. While a generation is ending only
    /// the transition timer advances.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }

        match self.phase {
            Phase::Idle => return,
            Phase::GenerationEnding => {
                for event in self.scheduler.tick() {
                    match event {
                        EngineEvent::Evolve => {
                            self.pending_evolution = None;
                            if let Err(e) = self.evolve_next_generation() {
                                error!(error = %e, "generation transition failed");
                            }
                        }
                    }
                }
                return;
            }
            Phase::Running => {}
        }

        self.world.advance();

        let world = &self.world;
        let params = &self.params;
        self.cars
            .par_iter_mut()
            .for_each(|car| car.update(world, params));

        self.generation_ticks += 1;
        self.distance_traveled += self.params.car_speed;

        if let Some(limit) = self.params.generation_tick_limit {
            if self.generation_ticks >= limit {
                for car in self.cars.iter_mut().filter(|car| car.is_alive()) {
                    car.retire();
                }
            }
        }

        let current = self
            .cars
            .iter()
            .map(Car::fitness)
            .fold(f32::NEG_INFINITY, f32::max);
        self.best_fitness = if self.generation_ticks == 1 {
            current
        } else {
            self.best_fitness.max(current)
        };

        if self.cars.iter().all(|car| !car.is_alive()) {
            info!(
                generation = self.generation,
                ticks = self.generation_ticks,
                best_fitness = self.best_fitness,
                "all cars dead"
            );
            self.phase = Phase::GenerationEnding;
            self.pending_evolution = Some(
                self.scheduler
                    .schedule(self.params.generation_delay_ticks, EngineEvent::Evolve),
            );
            debug!(delay = self.params.generation_delay_ticks, "evolution scheduled");
        }
    }

    /// Replaces the population with the next generation.
    ///
    /// Ranks the current cars by fitness, clones the elites unchanged, fills
    /// the remaining slots with mutated offspring, resets the world and
    /// records a [`GenerationSummary`]. Only valid once the current
    /// generation has ended; calling it early skips the pending delay.
    pub fn evolve_next_generation(&mut self) -> Result<(), SimError> {
        match self.phase {
            Phase::Idle => return Err(SimError::NotStarted),
            Phase::Running => return Err(SimError::AlreadyRunning),
            Phase::GenerationEnding => {}
        }

        if let Some(handle) = self.pending_evolution.take() {
            self.scheduler.cancel(handle);
        }

        let mut ranked = std::mem::take(&mut self.cars);
        ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let summary = GenerationSummary::from_population(
            self.generation,
            &ranked,
            self.distance_traveled,
            self.generation_ticks,
        );

        let next_generation = self.generation + 1;
        let population_size = self.params.population_size;
        let elite_count = self.params.elite_count.min(ranked.len());
        let rate = self.params.mutation_rate_for(next_generation);
        let amplitude = self.params.mutation_amplitude;

        let mut next = Vec::with_capacity(population_size);
        let elites = &ranked[..elite_count];

        next.extend(elites.iter().take(population_size).map(Car::clone_genotype));

        if elites.is_empty() {
            next.extend(
                (0..population_size).map(|_| Car::spawn(&self.params, next_generation, &mut self.rng)),
            );
        }

        let mut slot = 0;
        while next.len() < population_size {
            let parent = &elites[slot % elite_count];
            slot += 1;

            let child = if self.rng.random::<f32>() < self.params.crossover_rate {
                let partner = if self.rng.random::<f32>() < self.params.memory_sample_rate {
                    self.memory.sample(&mut self.rng)
                } else {
                    None
                };
                let partner =
                    partner.unwrap_or_else(|| &elites[self.rng.random_range(0..elite_count)]);
                NeuralNetwork::crossover(parent.brain(), partner.brain())
                    .and_then(|brain| parent.with_controller_checked(brain))
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "crossover rejected, cloning parent");
                        parent.clone_genotype()
                    })
            } else {
                parent.clone_genotype()
            };

            let mut child = child.tagged(next_generation);
            child.mutate(rate, amplitude, &mut self.rng);
            next.push(child);
        }

        for elite in elites {
            self.memory.remember(elite);
        }

        if self.params.reshuffle_layout {
            self.world.reshuffle(self.rng.random())?;
        } else {
            self.world.reset()?;
        }

        info!(
            generation = summary.generation,
            best_fitness = summary.best_fitness,
            average_fitness = summary.average_fitness,
            mutation_rate = rate,
            "generation complete"
        );

        self.history.push(summary);
        self.cars = next;
        self.generation = next_generation;
        self.generation_ticks = 0;
        self.distance_traveled = 0.0;
        self.best_fitness = 0.0;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Current parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether ticking is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current generation index (0 before the first generation).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Ticks simulated in the current generation.
    pub fn generation_ticks(&self) -> u64 {
        self.generation_ticks
    }

    /// Highest fitness any car has held during the current generation.
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    /// Distance traveled in the current generation.
    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Summaries of every finished generation, oldest first.
    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    /// Ticks left before the pending generation transition fires.
    pub fn transition_remaining(&self) -> Option<u32> {
        self.pending_evolution
            .and_then(|handle| self.scheduler.remaining(handle))
    }

    /// Every car of the current generation, dead or alive.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Cars that are still driving.
    pub fn alive_cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.iter().filter(|car| car.is_alive())
    }

    /// Past elites available as crossover partners.
    pub fn memory(&self) -> &MemoryQueue {
        &self.memory
    }

    /// The obstacle field.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Drawable views of the cars that are still driving.
    pub fn snapshot(&self) -> Vec<CarView> {
        self.alive_cars().map(Car::view).collect()
    }
}
