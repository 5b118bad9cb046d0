//! Moving rectangular obstacles.
//!
//! Obstacles are axis-aligned rectangles moving at constant velocity. Arena
//! walls are ordinary obstacles with zero velocity.

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::car::Car;
use super::error::SimError;
use super::geometry::OrientedRect;

/// An axis-aligned rectangle that moves at constant velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawObstacle")]
pub struct Obstacle {
    /// Center position.
    pub center: Coord<f32>,
    width: f32,
    height: f32,
    /// Displacement applied on every tick.
    pub velocity: Coord<f32>,
}

/// Unvalidated wire form; deserialization goes through [`Obstacle::new`].
#[derive(Deserialize)]
struct RawObstacle {
    center: Coord<f32>,
    width: f32,
    height: f32,
    velocity: Coord<f32>,
}

impl TryFrom<RawObstacle> for Obstacle {
    type Error = SimError;

    fn try_from(raw: RawObstacle) -> Result<Self, Self::Error> {
        Self::new(raw.center, raw.width, raw.height, raw.velocity)
    }
}

impl Obstacle {
    /// Creates an obstacle, rejecting non-positive dimensions.
    pub fn new(
        center: Coord<f32>,
        width: f32,
        height: f32,
        velocity: Coord<f32>,
    ) -> Result<Self, SimError> {
        // negated comparison also rejects NaN
        if !(width > 0.0 && height > 0.0) {
            return Err(SimError::DegenerateObstacle { width, height });
        }
        Ok(Self {
            center,
            width,
            height,
            velocity,
        })
    }

    /// Creates a static obstacle.
    pub fn wall(center: Coord<f32>, width: f32, height: f32) -> Result<Self, SimError> {
        Self::new(center, width, height, Coord::zero())
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Whether the obstacle never moves.
    pub fn is_static(&self) -> bool {
        self.velocity == Coord::zero()
    }

    /// Rectangle occupied by the obstacle.
    pub fn bounds(&self) -> OrientedRect {
        OrientedRect::axis_aligned(self.center, self.width, self.height)
    }

    /// Moves the obstacle by one tick of its velocity.
    pub fn advance(&mut self) {
        self.center = self.center + self.velocity;
    }

    /// Oriented overlap test against the car's current pose.
    pub fn collides_with(&self, car: &Car) -> bool {
        self.bounds().overlaps(&car.bounds())
    }
}
