//! Error taxonomy for the simulation engine.
//!
//! Per-tick physics, sensing and collision code is total and never fails;
//! errors only surface from controller calls with malformed shapes, from
//! construction of malformed geometry, and from configuration commands.

use thiserror::Error;

/// Errors emitted by the simulation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The controller received an input vector of the wrong length.
    #[error("controller expects {expected} inputs, got {actual}")]
    ShapeMismatch {
        /// Configured input size of the controller.
        expected: usize,
        /// Length of the vector that was passed in.
        actual: usize,
    },
    /// Crossover was attempted between networks of different architectures.
    #[error("networks must share architecture for crossover: {left:?} vs {right:?}")]
    IncompatibleTopology {
        /// Layer sizes of the first parent.
        left: Vec<usize>,
        /// Layer sizes of the second parent.
        right: Vec<usize>,
    },
    /// Configuration or evolution was attempted while a generation is being simulated.
    #[error("a generation is still being simulated")]
    AlreadyRunning,
    /// A generation transition was requested before any generation ran.
    #[error("simulation has not started; there is no generation to evolve")]
    NotStarted,
    /// Configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An obstacle was constructed with a non-positive dimension.
    #[error("obstacle dimensions must be positive, got {width}x{height}")]
    DegenerateObstacle {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}
