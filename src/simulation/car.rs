//! Cars: sensors, controller, motion and fitness accounting.
//!
//! A car sits at a fixed height while the road scrolls beneath it. Each tick
//! a living car casts its rays, feeds the readings through its controller,
//! steers, moves sideways, collects fitness and finally checks whether it hit
//! something. Dead cars are frozen.

use geo::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::brain::NeuralNetwork;
use super::error::SimError;
use super::geometry::OrientedRect;
use super::params::Params;
use super::sensor::Sensor;
use super::world::World;

/// Input value of a ray that sees nothing.
pub const CLEAR_SIGNAL: f32 = -1.0;

/// Steepness of the danger curve for rays that hit an obstacle.
pub const DANGER_SHARPNESS: f32 = 2.0;

/// Encodes a sensor reading as a controller input.
///
/// A clear ray yields [`CLEAR_SIGNAL`]. A hit yields
/// `exp(k · (1 − distance / range))`, which lies in `[1, e^k]` and grows as
/// the obstacle gets closer.
pub fn encode_reading(sensor: &Sensor) -> f32 {
    match sensor.hit() {
        None => CLEAR_SIGNAL,
        Some(_) => (DANGER_SHARPNESS * (1.0 - sensor.distance() / sensor.max_range())).exp(),
    }
}

/// Why a car stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Overlapped an obstacle or a wall.
    Obstacle,
    /// Left the road sideways.
    LaneExit,
    /// Survived until the generation tick limit.
    TickLimit,
}

/// Runtime state of a living car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Driving {
    /// Center of the car.
    pub position: Coord<f32>,
    /// Heading in radians, 0 pointing up the road.
    pub heading: f32,
    /// Accumulated fitness.
    pub fitness: f32,
    /// Ticks survived so far.
    pub ticks: u64,
}

/// Final state of a dead car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wreck {
    /// Center of the car when it died.
    pub position: Coord<f32>,
    /// Heading when it died.
    pub heading: f32,
    /// Fitness at death, never changed afterwards.
    pub fitness: f32,
    /// Ticks survived.
    pub ticks: u64,
    /// What ended the run.
    pub cause: DeathCause,
}

/// Lifecycle of a car. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CarState {
    /// Still driving.
    Alive(Driving),
    /// Crashed or retired.
    Dead(Wreck),
}

/// A simulated car with ray sensors and a neural controller.
#[derive(Debug)]
pub struct Car {
    width: f32,
    height: f32,
    speed: f32,
    max_steer: f32,
    max_heading: f32,
    lane_penalty: f32,
    generation: u32,
    start: Coord<f32>,
    sensors: Vec<Sensor>,
    brain: NeuralNetwork,
    state: CarState,
}

impl Car {
    /// Creates a car with a random controller.
    pub fn spawn<R: Rng + ?Sized>(params: &Params, generation: u32, rng: &mut R) -> Self {
        let brain = NeuralNetwork::random(&params.layer_sizes(), params.weight_scale, rng);
        Self::assemble(params, brain, generation)
    }

    /// Creates a car driven by an existing controller.
    pub fn with_brain(
        params: &Params,
        brain: NeuralNetwork,
        generation: u32,
    ) -> Result<Self, SimError> {
        if brain.input_size() != params.sensor_count {
            return Err(SimError::ShapeMismatch {
                expected: params.sensor_count,
                actual: brain.input_size(),
            });
        }
        Ok(Self::assemble(params, brain, generation))
    }

    fn assemble(params: &Params, brain: NeuralNetwork, generation: u32) -> Self {
        let start = Coord {
            x: params.lane_center(),
            y: params.car_y(),
        };
        Self {
            width: params.car_width,
            height: params.car_height,
            speed: params.car_speed,
            max_steer: params.max_steer,
            max_heading: params.max_heading,
            lane_penalty: params.lane_penalty,
            generation,
            start,
            sensors: Sensor::fan(params.sensor_count, params.sensor_spread, params.sensor_range),
            brain,
            state: CarState::Alive(Driving {
                position: start,
                heading: 0.0,
                fitness: 0.0,
                ticks: 0,
            }),
        }
    }

    /// Copies the genotype into a fresh car at the start line.
    ///
    /// Static parameters and the generation tag are kept and the controller
    /// is deep-copied; pose, fitness and state are reset.
    pub fn clone_genotype(&self) -> Self {
        self.with_controller(self.brain.clone())
    }

    /// A fresh car with the same static parameters but another controller.
    ///
    /// Fails when the controller does not read this car's sensors.
    pub fn with_controller_checked(&self, brain: NeuralNetwork) -> Result<Self, SimError> {
        if brain.input_size() != self.sensors.len() {
            return Err(SimError::ShapeMismatch {
                expected: self.sensors.len(),
                actual: brain.input_size(),
            });
        }
        Ok(self.with_controller(brain))
    }

    fn with_controller(&self, brain: NeuralNetwork) -> Self {
        Self {
            width: self.width,
            height: self.height,
            speed: self.speed,
            max_steer: self.max_steer,
            max_heading: self.max_heading,
            lane_penalty: self.lane_penalty,
            generation: self.generation,
            start: self.start,
            sensors: self
                .sensors
                .iter()
                .map(|s| Sensor::new(s.base_angle(), s.max_range()))
                .collect(),
            brain,
            state: CarState::Alive(Driving {
                position: self.start,
                heading: 0.0,
                fitness: 0.0,
                ticks: 0,
            }),
        }
    }

    /// Sets the generation tag.
    #[must_use]
    pub fn tagged(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Applies mutation to the controller.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, amplitude: f32, rng: &mut R) {
        self.brain.mutate(rate, amplitude, rng);
    }

    /// Generation this car was created for.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Car body width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Car body height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Controller of this car.
    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    /// Sensors in fan order, left to right.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &CarState {
        &self.state
    }

    /// Whether the car is still driving.
    pub fn is_alive(&self) -> bool {
        matches!(self.state, CarState::Alive(_))
    }

    /// Current (or final) fitness.
    pub fn fitness(&self) -> f32 {
        match self.state {
            CarState::Alive(driving) => driving.fitness,
            CarState::Dead(wreck) => wreck.fitness,
        }
    }

    /// Current (or final) center position.
    pub fn position(&self) -> Coord<f32> {
        match self.state {
            CarState::Alive(driving) => driving.position,
            CarState::Dead(wreck) => wreck.position,
        }
    }

    /// Current (or final) heading.
    pub fn heading(&self) -> f32 {
        match self.state {
            CarState::Alive(driving) => driving.heading,
            CarState::Dead(wreck) => wreck.heading,
        }
    }

    /// Ticks survived.
    pub fn ticks(&self) -> u64 {
        match self.state {
            CarState::Alive(driving) => driving.ticks,
            CarState::Dead(wreck) => wreck.ticks,
        }
    }

    /// Cause of death, if dead.
    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.state {
            CarState::Alive(_) => None,
            CarState::Dead(wreck) => Some(wreck.cause),
        }
    }

    /// Rotated body rectangle at the current pose.
    pub fn bounds(&self) -> OrientedRect {
        OrientedRect::new(self.position(), self.width, self.height, self.heading())
    }

    /// Controller inputs for the last cast.
    pub fn sensor_inputs(&self) -> Vec<f32> {
        self.sensors.iter().map(encode_reading).collect()
    }

    /// Advances a living car by one tick; dead cars are left untouched.
    pub fn update(&mut self, world: &World, params: &Params) {
        let CarState::Alive(driving) = &mut self.state else {
            return;
        };

        for sensor in &mut self.sensors {
            sensor.set_angle(driving.heading);
            sensor.cast(driving.position, world.obstacles());
        }

        let inputs: Vec<f32> = self.sensors.iter().map(encode_reading).collect();
        let output = self
            .brain
            .predict(&inputs)
            .expect("sensor fan matches controller input size");

        let steer = (output * self.max_steer).clamp(-self.max_steer, self.max_steer);
        driving.heading = (driving.heading + steer).clamp(-self.max_heading, self.max_heading);
        driving.position.x += driving.heading.sin() * self.speed;

        driving.fitness += self.speed;
        if self.lane_penalty > 0.0 {
            let half_lane = params.arena_width / 2.0;
            let offset = ((driving.position.x - params.lane_center()).abs() / half_lane).min(1.0);
            driving.fitness -= self.lane_penalty * offset;
        }
        // the fan has an odd number of rays, so the middle one points ahead
        let forward = &self.sensors[self.sensors.len() / 2];
        if forward.hit().is_some()
            && forward.distance() < params.proximity_threshold * forward.max_range()
        {
            driving.fitness -= params.proximity_penalty;
        }
        driving.ticks += 1;

        let x = driving.position.x;
        let reach = self.bounds().horizontal_reach();
        let cause = if world.collides(self) {
            Some(DeathCause::Obstacle)
        } else if x - reach < 0.0 || x + reach > params.arena_width {
            Some(DeathCause::LaneExit)
        } else {
            None
        };

        if let Some(cause) = cause {
            self.kill(cause);
        }
    }

    /// Ends a living car's run because the generation hit its tick limit.
    pub fn retire(&mut self) {
        self.kill(DeathCause::TickLimit);
    }

    fn kill(&mut self, cause: DeathCause) {
        if let CarState::Alive(driving) = self.state {
            debug!(?cause, fitness = driving.fitness, ticks = driving.ticks, "car died");
            self.state = CarState::Dead(Wreck {
                position: driving.position,
                heading: driving.heading,
                fitness: driving.fitness,
                ticks: driving.ticks,
                cause,
            });
        }
    }

    /// Read-only view for presentation layers.
    pub fn view(&self) -> CarView {
        CarView {
            position: self.position(),
            heading: self.heading(),
            fitness: self.fitness(),
            alive: self.is_alive(),
            generation: self.generation,
            rays: self
                .sensors
                .iter()
                .map(|s| RayView {
                    origin: s.origin(),
                    end: s.end(),
                    hit: s.hit(),
                })
                .collect(),
        }
    }
}

/// Serializable snapshot of a car for drawing.
#[derive(Debug, Clone, Serialize)]
pub struct CarView {
    /// Center position.
    pub position: Coord<f32>,
    /// Heading in radians.
    pub heading: f32,
    /// Current fitness.
    pub fitness: f32,
    /// Whether the car is still driving.
    pub alive: bool,
    /// Generation tag.
    pub generation: u32,
    /// Ray segments from the last cast.
    pub rays: Vec<RayView>,
}

/// Serializable snapshot of one ray.
#[derive(Debug, Clone, Serialize)]
pub struct RayView {
    /// Ray origin.
    pub origin: Coord<f32>,
    /// Visible end of the ray.
    pub end: Coord<f32>,
    /// Nearest hit point, if any.
    pub hit: Option<Coord<f32>>,
}
