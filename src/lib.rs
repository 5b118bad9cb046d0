//! # Roadevo - Neuroevolution of Obstacle-Dodging Cars
//!
//! A population of cars with small neural network controllers learns to dodge
//! obstacles scrolling down a road. Cars sense obstacles with ray-cast
//! rangefinders and steer left or right; a genetic algorithm breeds the best
//! drivers of each generation.
//!
//! ## Features
//!
//! - Feed-forward controllers (MLP with tanh activation)
//! - Genetic algorithm evolution (elitism, averaging crossover, mutation)
//! - Ray-cast sensors against rectangular obstacles
//! - Oriented (separating-axis) collision detection
//! - Reproducible runs from a single seeded random generator
//! - Per-generation statistics for plotting
//!
//! ## Core Modules
//!
//! - [`simulation::manager`] - Generation loop and reproduction
//! - [`simulation::car`] - Car behavior, fitness and state
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::world`] - Obstacle field and arena walls
//! - [`simulation::sensor`] - Ray-cast rangefinders
//! - [`simulation::geometry`] - Segment intersection and rectangle overlap

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network controllers and genetic operators.
    pub mod brain;
    /// Cars: sensing, steering, fitness and lifecycle.
    pub mod car;
    /// Error taxonomy.
    pub mod error;
    /// Geometric utility functions for intersections and overlap tests.
    pub mod geometry;
    /// Generation loop and reproduction.
    pub mod manager;
    /// Bounded memory of past elites.
    pub mod memory;
    /// Moving rectangular obstacles.
    pub mod obstacle;
    /// Simulation parameters.
    pub mod params;
    /// Ray-cast proximity sensors.
    pub mod sensor;
    /// Per-generation statistics.
    pub mod stats;
    /// Fire-once delayed events.
    pub mod timer;
    /// Obstacle field owned by the simulation.
    pub mod world;
}
