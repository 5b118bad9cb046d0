//! Per-generation summaries for reporting and plotting.

use serde::{Deserialize, Serialize};

use super::brain::NeuralNetwork;
use super::car::Car;

/// Summary of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation index, starting at 1.
    pub generation: u32,
    /// Highest fitness in the generation.
    pub best_fitness: f32,
    /// Mean fitness of the generation.
    pub average_fitness: f32,
    /// Distance the road scrolled while at least one car was alive.
    pub distance_traveled: f32,
    /// Ticks simulated in the generation.
    pub ticks: u64,
    /// Mean controller distance of every car to the best car.
    pub diversity: f32,
}

impl GenerationSummary {
    /// Summarizes a finished population.
    pub fn from_population(
        generation: u32,
        cars: &[Car],
        distance_traveled: f32,
        ticks: u64,
    ) -> Self {
        if cars.is_empty() {
            return Self {
                generation,
                best_fitness: 0.0,
                average_fitness: 0.0,
                distance_traveled,
                ticks,
                diversity: 0.0,
            };
        }

        let best = cars
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
            .unwrap_or(&cars[0]);
        let average = cars.iter().map(Car::fitness).sum::<f32>() / cars.len() as f32;
        let diversity = cars
            .iter()
            .map(|car| NeuralNetwork::distance(car.brain(), best.brain()))
            .sum::<f32>()
            / cars.len() as f32;

        Self {
            generation,
            best_fitness: best.fitness(),
            average_fitness: average,
            distance_traveled,
            ticks,
            diversity,
        }
    }
}
