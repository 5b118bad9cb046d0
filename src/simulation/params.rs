use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::error::SimError;

/// Simulation parameters that control arena, cars, controllers and evolution.
///
/// Defaults reproduce a 600×800 road with cars fixed at 80 % of the height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Arena width.
    pub arena_width: f32,
    /// Arena height.
    pub arena_height: f32,
    /// Thickness of the four boundary walls.
    pub wall_thickness: f32,

    /// Car body width.
    pub car_width: f32,
    /// Car body height.
    pub car_height: f32,
    /// Vertical position of the cars as a fraction of the arena height.
    pub car_y_fraction: f32,
    /// Forward speed; also the per-tick fitness reward and scroll speed of the road.
    pub car_speed: f32,
    /// Maximum heading change per tick in radians.
    pub max_steer: f32,
    /// Absolute heading limit in radians.
    pub max_heading: f32,

    /// Number of rays per car; odd, so the middle ray faces forward.
    pub sensor_count: usize,
    /// Angle covered by the fan of rays in radians.
    pub sensor_spread: f32,
    /// Maximum ray length.
    pub sensor_range: f32,

    /// Hidden layer sizes; the input size is `sensor_count` and the output is one neuron.
    pub hidden_layers: Vec<usize>,
    /// Initial weights and biases are drawn from `[-weight_scale, weight_scale]`.
    pub weight_scale: f32,

    /// Penalty multiplier for lateral distance from the lane center (0 disables it).
    pub lane_penalty: f32,
    /// Flat penalty applied when the forward ray sees an obstacle too close.
    pub proximity_penalty: f32,
    /// Fraction of the sensor range below which the proximity penalty applies.
    pub proximity_threshold: f32,

    /// Number of cars per generation.
    pub population_size: usize,
    /// Number of top cars carried unmodified into the next generation.
    pub elite_count: usize,
    /// Initial per-value mutation probability.
    pub mutation_rate: f32,
    /// Multiplicative decay of the mutation rate per generation (1 keeps it fixed).
    pub mutation_decay: f32,
    /// Lower bound for the decayed mutation rate.
    pub min_mutation_rate: f32,
    /// Magnitude of a single mutation step.
    pub mutation_amplitude: f32,
    /// Probability that a child is produced by crossover rather than cloning.
    pub crossover_rate: f32,
    /// Capacity of the memory queue of past elites (0 disables it).
    pub memory_capacity: usize,
    /// Probability that a crossover partner is drawn from the memory queue.
    pub memory_sample_rate: f32,

    /// Number of moving obstacles (walls excluded).
    pub obstacle_count: usize,
    /// Obstacle width.
    pub obstacle_width: f32,
    /// Obstacle height.
    pub obstacle_height: f32,
    /// Downward obstacle speed per tick.
    pub obstacle_speed: f32,
    /// Minimum free space between the initial obstacles and the cars.
    pub spawn_clearance: f32,
    /// Draw a fresh obstacle layout at every generation instead of replaying the first.
    pub reshuffle_layout: bool,

    /// Ticks between extinction and reproduction.
    pub generation_delay_ticks: u32,
    /// Optional cap on ticks per generation; survivors are retired when reached.
    pub generation_tick_limit: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            arena_width: 600.0,
            arena_height: 800.0,
            wall_thickness: 10.0,
            car_width: 40.0,
            car_height: 70.0,
            car_y_fraction: 0.8,
            car_speed: 1.0,
            max_steer: 0.02,
            max_heading: PI / 4.0,
            sensor_count: 7,
            sensor_spread: PI / 2.0,
            sensor_range: 200.0,
            hidden_layers: vec![10, 5],
            weight_scale: 1.0,
            lane_penalty: 0.0,
            proximity_penalty: 0.5,
            proximity_threshold: 0.25,
            population_size: 50,
            elite_count: 5,
            mutation_rate: 0.2,
            mutation_decay: 0.98,
            min_mutation_rate: 0.05,
            mutation_amplitude: 0.08,
            crossover_rate: 0.5,
            memory_capacity: 20,
            memory_sample_rate: 0.2,
            obstacle_count: 8,
            obstacle_width: 40.0,
            obstacle_height: 40.0,
            obstacle_speed: 1.0,
            spawn_clearance: 100.0,
            reshuffle_layout: false,
            generation_delay_ticks: 60,
            generation_tick_limit: None,
        }
    }
}

impl Params {
    /// Layer sizes of every car's controller.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.sensor_count);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(1);
        sizes
    }

    /// Fixed vertical position of the cars.
    pub fn car_y(&self) -> f32 {
        self.arena_height * self.car_y_fraction
    }

    /// Horizontal center of the lane.
    pub fn lane_center(&self) -> f32 {
        self.arena_width / 2.0
    }

    /// Mutation rate for a generation (1-based), decayed and floored.
    pub fn mutation_rate_for(&self, generation: u32) -> f32 {
        let exponent = i32::try_from(generation.saturating_sub(1)).unwrap_or(i32::MAX);
        let decayed = self.mutation_rate * self.mutation_decay.powi(exponent);
        decayed.max(self.min_mutation_rate)
    }

    /// Checks that the parameters describe a usable simulation.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: &str| Err(SimError::InvalidConfiguration(msg.to_string()));

        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return invalid("arena dimensions must be positive");
        }
        if !(self.car_width > 0.0 && self.car_height > 0.0) {
            return invalid("car dimensions must be positive");
        }
        if !(self.obstacle_width > 0.0 && self.obstacle_height > 0.0) {
            return invalid("obstacle dimensions must be positive");
        }
        if !(self.wall_thickness > 0.0) {
            return invalid("wall thickness must be positive");
        }
        if self.obstacle_width >= self.arena_width - 2.0 * self.wall_thickness {
            return invalid("obstacles do not fit between the walls");
        }
        if !(0.0..=1.0).contains(&self.car_y_fraction) {
            return invalid("car_y_fraction must be within [0, 1]");
        }
        if self.population_size == 0 {
            return invalid("population size must be positive");
        }
        if self.elite_count == 0 {
            return invalid("elite count must be positive");
        }
        if self.elite_count > self.population_size {
            return invalid("elite count cannot exceed population size");
        }
        if self.sensor_count % 2 == 0 {
            return invalid("sensor count must be odd so one ray faces forward");
        }
        if !(self.sensor_range > 0.0) {
            return invalid("sensor range must be positive");
        }
        if self.hidden_layers.contains(&0) {
            return invalid("hidden layers must not be empty");
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("min_mutation_rate", self.min_mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("memory_sample_rate", self.memory_sample_rate),
            ("proximity_threshold", self.proximity_threshold),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimError::InvalidConfiguration(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.min_mutation_rate > self.mutation_rate {
            return invalid("min_mutation_rate cannot exceed mutation_rate");
        }
        if !(self.mutation_decay > 0.0 && self.mutation_decay <= 1.0) {
            return invalid("mutation_decay must be within (0, 1]");
        }
        if !(self.mutation_amplitude > 0.0) {
            return invalid("mutation amplitude must be positive");
        }
        if !(self.max_steer >= 0.0 && self.max_heading >= 0.0) {
            return invalid("steering limits must not be negative");
        }
        if self.generation_tick_limit == Some(0) {
            return invalid("generation tick limit must be positive");
        }
        Ok(())
    }
}
