//! Ray-cast proximity sensor attached to a car.
//!
//! A sensor is a fixed-angle rangefinder. Each tick the owning car writes the
//! sensor's absolute angle and casts it from the car's center against every
//! obstacle edge; the nearest intersection is kept.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

use super::geometry::{distance, heading_vector, segment_intersection};
use super::obstacle::Obstacle;

/// A single directional rangefinder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    base_angle: f32,
    angle: f32,
    max_range: f32,
    origin: Coord<f32>,
    end: Coord<f32>,
    hit: Option<Coord<f32>>,
    distance: f32,
}

impl Sensor {
    /// Creates a sensor with an offset from the car's forward axis.
    pub fn new(base_angle: f32, max_range: f32) -> Self {
        Self {
            base_angle,
            angle: base_angle,
            max_range,
            origin: Coord::zero(),
            end: Coord::zero(),
            hit: None,
            distance: max_range,
        }
    }

    /// Evenly spreads `count` sensors over `spread` radians centered on the
    /// forward axis. A single sensor points straight ahead.
    pub fn fan(count: usize, spread: f32, max_range: f32) -> Vec<Self> {
        if count == 1 {
            return vec![Self::new(0.0, max_range)];
        }
        let step = spread / (count as f32 - 1.0);
        (0..count)
            .map(|i| Self::new(-spread / 2.0 + i as f32 * step, max_range))
            .collect()
    }

    /// Offset from the car's heading, fixed at construction.
    pub fn base_angle(&self) -> f32 {
        self.base_angle
    }

    /// Current absolute orientation.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Sets the absolute orientation from the owner's heading.
    pub fn set_angle(&mut self, heading: f32) {
        self.angle = heading + self.base_angle;
    }

    /// Maximum range of the ray.
    pub fn max_range(&self) -> f32 {
        self.max_range
    }

    /// Origin used by the last cast.
    pub fn origin(&self) -> Coord<f32> {
        self.origin
    }

    /// End point of the visible ray: the hit point, or the full-range end.
    pub fn end(&self) -> Coord<f32> {
        self.end
    }

    /// Nearest hit point from the last cast.
    pub fn hit(&self) -> Option<Coord<f32>> {
        self.hit
    }

    /// Distance to the nearest hit, or the max range when nothing was hit.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Recomputes the nearest hit against all obstacle edges.
    pub fn cast(&mut self, origin: Coord<f32>, obstacles: &[Obstacle]) {
        self.origin = origin;
        let ray_end = origin + heading_vector(self.angle) * self.max_range;
        let ray = Line::new(origin, ray_end);

        let mut closest = None;
        let mut min_distance = self.max_range;

        for obstacle in obstacles {
            for edge in obstacle.bounds().edges() {
                if let Some(point) = segment_intersection(ray, edge) {
                    let d = distance(origin, point);
                    if d < min_distance {
                        min_distance = d;
                        closest = Some(point);
                    }
                }
            }
        }

        self.hit = closest;
        self.distance = min_distance;
        self.end = closest.unwrap_or(ray_end);
    }
}
