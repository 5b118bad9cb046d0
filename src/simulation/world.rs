//! The obstacle field cars drive through.
//!
//! The world owns the arena walls and the moving obstacles. Obstacles scroll
//! down the road and are recycled to the top once they leave it, so their
//! number never changes during a generation. The layout is generated from a
//! seed, which makes [`World::reset`] replay the exact same course.

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::car::Car;
use super::error::SimError;
use super::obstacle::Obstacle;
use super::params::Params;

/// Arena geometry and obstacle settings used to (re)build the layout.
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    width: f32,
    height: f32,
    wall_thickness: f32,
    obstacle_count: usize,
    obstacle_width: f32,
    obstacle_height: f32,
    obstacle_speed: f32,
    spawn_limit: f32,
}

impl Layout {
    fn from_params(params: &Params) -> Self {
        let car_top = params.car_y() - params.car_height / 2.0;
        Self {
            width: params.arena_width,
            height: params.arena_height,
            wall_thickness: params.wall_thickness,
            obstacle_count: params.obstacle_count,
            obstacle_width: params.obstacle_width,
            obstacle_height: params.obstacle_height,
            obstacle_speed: params.obstacle_speed,
            spawn_limit: car_top - params.spawn_clearance - params.obstacle_height / 2.0,
        }
    }

    fn random_lane_x(&self, rng: &mut Pcg32) -> f32 {
        let lo = self.wall_thickness + self.obstacle_width / 2.0;
        let hi = self.width - self.wall_thickness - self.obstacle_width / 2.0;
        sample(rng, lo, hi)
    }

    fn random_spawn_y(&self, rng: &mut Pcg32) -> f32 {
        let lo = self.wall_thickness + self.obstacle_height / 2.0;
        sample(rng, lo, self.spawn_limit)
    }
}

fn sample(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

/// Owns and advances every obstacle of the arena.
#[derive(Debug, Clone)]
pub struct World {
    layout: Layout,
    layout_seed: u64,
    rng: Pcg32,
    obstacles: Vec<Obstacle>,
    wall_count: usize,
    fixed: Option<Vec<Obstacle>>,
}

impl World {
    /// Creates the arena and its initial layout.
    pub fn new(params: &Params, layout_seed: u64) -> Result<Self, SimError> {
        let layout = Layout::from_params(params);
        let mut world = Self {
            obstacles: Vec::with_capacity(layout.obstacle_count + 4),
            rng: Pcg32::seed_from_u64(layout_seed),
            layout,
            layout_seed,
            wall_count: 0,
            fixed: None,
        };
        world.populate()?;
        Ok(world)
    }

    /// Creates an arena holding only the given obstacles (no walls).
    ///
    /// Used for hand-built courses; [`World::reset`] restores these obstacles.
    pub fn with_obstacles(params: &Params, obstacles: Vec<Obstacle>) -> Self {
        let mut layout = Layout::from_params(params);
        layout.obstacle_count = obstacles.len();
        Self {
            layout,
            layout_seed: 0,
            rng: Pcg32::seed_from_u64(0),
            wall_count: 0,
            fixed: Some(obstacles.clone()),
            obstacles,
        }
    }

    fn populate(&mut self) -> Result<(), SimError> {
        if let Some(fixed) = &self.fixed {
            self.obstacles.clear();
            self.obstacles.extend_from_slice(fixed);
            return Ok(());
        }

        let layout = &self.layout;
        let (w, h, t) = (layout.width, layout.height, layout.wall_thickness);

        self.obstacles.clear();
        self.obstacles.extend([
            Obstacle::wall(Coord { x: w / 2.0, y: t / 2.0 }, w, t)?,
            Obstacle::wall(Coord { x: w / 2.0, y: h - t / 2.0 }, w, t)?,
            Obstacle::wall(Coord { x: t / 2.0, y: h / 2.0 }, t, h)?,
            Obstacle::wall(Coord { x: w - t / 2.0, y: h / 2.0 }, t, h)?,
        ]);
        self.wall_count = self.obstacles.len();

        let velocity = Coord {
            x: 0.0,
            y: layout.obstacle_speed,
        };
        for _ in 0..layout.obstacle_count {
            let center = Coord {
                x: layout.random_lane_x(&mut self.rng),
                y: layout.random_spawn_y(&mut self.rng),
            };
            self.obstacles.push(Obstacle::new(
                center,
                layout.obstacle_width,
                layout.obstacle_height,
                velocity,
            )?);
        }
        Ok(())
    }

    /// All obstacles, walls first.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// The moving obstacles.
    pub fn moving_obstacles(&self) -> &[Obstacle] {
        &self.obstacles[self.wall_count..]
    }

    /// The static arena walls.
    pub fn walls(&self) -> &[Obstacle] {
        &self.obstacles[..self.wall_count]
    }

    /// Seed the layout is generated from.
    pub fn layout_seed(&self) -> u64 {
        self.layout_seed
    }

    /// Moves every obstacle by one tick, recycling those that left the road.
    pub fn advance(&mut self) {
        let layout = &self.layout;
        for obstacle in &mut self.obstacles[self.wall_count..] {
            if obstacle.is_static() {
                continue;
            }
            obstacle.advance();
            if obstacle.center.y + obstacle.height() / 2.0 >= layout.height {
                obstacle.center.y = -obstacle.height() / 2.0;
                obstacle.center.x = layout.random_lane_x(&mut self.rng);
            }
        }
    }

    /// Restores the initial layout in place.
    ///
    /// Generated worlds replay the same course from their layout seed;
    /// hand-built worlds get their original obstacles back.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.rng = Pcg32::seed_from_u64(self.layout_seed);
        self.populate()
    }

    /// Switches to a new layout seed and rebuilds the course.
    pub fn reshuffle(&mut self, layout_seed: u64) -> Result<(), SimError> {
        self.layout_seed = layout_seed;
        self.reset()
    }

    /// Applies new arena and obstacle settings and rebuilds the course.
    ///
    /// A hand-built world becomes a generated one.
    pub fn reconfigure(&mut self, params: &Params) -> Result<(), SimError> {
        self.layout = Layout::from_params(params);
        self.fixed = None;
        self.rng = Pcg32::seed_from_u64(self.layout_seed);
        self.populate()
    }

    /// Whether any obstacle overlaps the car's current body.
    pub fn collides(&self, car: &Car) -> bool {
        self.obstacles.iter().any(|o| o.collides_with(car))
    }
}
