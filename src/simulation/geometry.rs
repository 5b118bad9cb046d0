//! Geometric primitives: segment intersection and oriented-rectangle overlap.
//!
//! Coordinates follow screen conventions: x grows to the right and y grows
//! downward, so "forward" for an unrotated body is `(0, -1)`.

use geo::algorithm::Distance;
use geo::{Coord, Euclidean, Line, Point};

/// Unit direction for an angle measured clockwise from the upward axis.
pub fn heading_vector(angle: f32) -> Coord<f32> {
    Coord {
        x: angle.sin(),
        y: -angle.cos(),
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Coord<f32>, b: Coord<f32>) -> f32 {
    Euclidean.distance(Point::from(a), Point::from(b))
}

/// Intersection point of two line segments, if any.
///
/// Uses the parametric determinant form: the segments `a` and `b` are written
/// as `a.start + t·(a.end − a.start)` and `b.start + u·(b.end − b.start)` and
/// a hit is reported only when both `t` and `u` lie in `[0, 1]`.
///
/// Parallel (and collinear) segments have a zero determinant and are treated
/// as non-intersecting.
pub fn segment_intersection(a: Line<f32>, b: Line<f32>) -> Option<Coord<f32>> {
    let (x1, y1) = a.start.x_y();
    let (x2, y2) = a.end.x_y();
    let (x3, y3) = b.start.x_y();
    let (x4, y4) = b.end.x_y();

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom == 0.0 {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a.start + a.delta() * t)
    } else {
        None
    }
}

/// A rectangle with a center, half extents and a rotation.
///
/// The rotation turns the local x axis `(1, 0)` toward `+y`, which matches a
/// canvas-style clockwise rotation on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    /// Center point.
    pub center: Coord<f32>,
    /// Half of the width and half of the height.
    pub half_extents: Coord<f32>,
    /// Rotation in radians.
    pub angle: f32,
}

impl OrientedRect {
    /// Creates a rectangle from its center, full size and rotation.
    pub fn new(center: Coord<f32>, width: f32, height: f32, angle: f32) -> Self {
        Self {
            center,
            half_extents: Coord {
                x: width / 2.0,
                y: height / 2.0,
            },
            angle,
        }
    }

    /// Creates an unrotated rectangle.
    pub fn axis_aligned(center: Coord<f32>, width: f32, height: f32) -> Self {
        Self::new(center, width, height, 0.0)
    }

    /// Local x and y axes as unit vectors.
    pub fn axes(&self) -> [Coord<f32>; 2] {
        let (sin, cos) = self.angle.sin_cos();
        [Coord { x: cos, y: sin }, Coord { x: -sin, y: cos }]
    }

    /// The four corners in order top-left, top-right, bottom-right, bottom-left
    /// (in local space).
    pub fn corners(&self) -> [Coord<f32>; 4] {
        let [ax, ay] = self.axes();
        let hx = ax * self.half_extents.x;
        let hy = ay * self.half_extents.y;
        [
            self.center - hx - hy,
            self.center + hx - hy,
            self.center + hx + hy,
            self.center - hx + hy,
        ]
    }

    /// The four edges as segments, walking the corners in order.
    pub fn edges(&self) -> [Line<f32>; 4] {
        let [c0, c1, c2, c3] = self.corners();
        [
            Line::new(c0, c1),
            Line::new(c1, c2),
            Line::new(c2, c3),
            Line::new(c3, c0),
        ]
    }

    /// Half of the horizontal span of the rotated rectangle.
    pub fn horizontal_reach(&self) -> f32 {
        let (sin, cos) = self.angle.sin_cos();
        (self.half_extents.x * cos).abs() + (self.half_extents.y * sin).abs()
    }

    fn project(&self, axis: Coord<f32>) -> (f32, f32) {
        self.corners()
            .iter()
            .map(|c| dot(*c, axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }

    /// Separating-axis overlap test between two oriented rectangles.
    ///
    /// The candidate axes are both local axes of each rectangle. Touching
    /// boundaries do not count as overlap.
    pub fn overlaps(&self, other: &OrientedRect) -> bool {
        let [a0, a1] = self.axes();
        let [b0, b1] = other.axes();
        [a0, a1, b0, b1].into_iter().all(|axis| {
            let (min_a, max_a) = self.project(axis);
            let (min_b, max_b) = other.project(axis);
            max_a > min_b && max_b > min_a
        })
    }
}

fn dot(a: Coord<f32>, b: Coord<f32>) -> f32 {
    a.x * b.x + a.y * b.y
}
