#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use geo::Coord;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use roadevo::simulation::brain::NeuralNetwork;
use roadevo::simulation::car::{CLEAR_SIGNAL, Car, CarState, DeathCause};
use roadevo::simulation::error::SimError;
use roadevo::simulation::obstacle::Obstacle;
use roadevo::simulation::params::Params;
use roadevo::simulation::world::World;

fn create_test_params() -> Params {
    Params {
        sensor_count: 5,
        hidden_layers: vec![6],
        ..Params::default()
    }
}

fn rng() -> Pcg32 {
    Pcg32::seed_from_u64(9)
}

fn empty_world(params: &Params) -> World {
    World::with_obstacles(params, Vec::new())
}

fn block(x: f32, y: f32) -> Obstacle {
    Obstacle::wall(Coord { x, y }, 40.0, 40.0).unwrap()
}

#[test]
fn test_spawn() {
    let params = create_test_params();
    let car = Car::spawn(&params, 3, &mut rng());

    assert!(car.is_alive());
    assert_eq!(car.generation(), 3);
    assert_eq!(car.fitness(), 0.0);
    assert_eq!(car.ticks(), 0);
    assert_eq!(car.heading(), 0.0);
    assert_eq!(
        car.position(),
        Coord {
            x: params.lane_center(),
            y: params.car_y(),
        }
    );
    assert_eq!(car.sensors().len(), params.sensor_count);
    assert_eq!(car.brain().layer_sizes(), params.layer_sizes().as_slice());
    assert!(car.death_cause().is_none());
}

#[test]
fn test_with_brain_checks_input_size() {
    let params = create_test_params();
    let brain = NeuralNetwork::random(&[3, 4, 1], 1.0, &mut rng());

    assert_eq!(
        Car::with_brain(&params, brain, 1).unwrap_err(),
        SimError::ShapeMismatch {
            expected: params.sensor_count,
            actual: 3,
        }
    );

    let brain = NeuralNetwork::random(&params.layer_sizes(), 1.0, &mut rng());
    assert!(Car::with_brain(&params, brain, 1).is_ok());
}

#[test]
fn test_update_in_empty_world() {
    let params = create_test_params();
    let world = empty_world(&params);
    let mut car = Car::spawn(&params, 1, &mut rng());

    car.update(&world, &params);

    assert!(car.is_alive());
    assert_eq!(car.ticks(), 1);
    assert_eq!(car.fitness(), params.car_speed);
    assert!(car.heading().abs() <= params.max_steer + 1e-6);
    assert_eq!(car.position().y, params.car_y());
    assert!(car.sensor_inputs().iter().all(|&v| v == CLEAR_SIGNAL));
}

#[test]
fn test_heading_stays_within_limit() {
    let params = Params {
        max_steer: 0.2,
        max_heading: 0.3,
        ..create_test_params()
    };
    let world = empty_world(&params);

    for seed in 0..10 {
        let mut car = Car::spawn(&params, 1, &mut Pcg32::seed_from_u64(seed));
        for _ in 0..30 {
            let before = car.heading();
            car.update(&world, &params);
            if !car.is_alive() {
                break;
            }
            assert!(car.heading().abs() <= params.max_heading + 1e-6);
            assert!((car.heading() - before).abs() <= params.max_steer + 1e-6);
        }
    }
}

#[test]
fn test_death_by_obstacle_freezes_car() {
    let params = create_test_params();
    let mut car = Car::spawn(&params, 1, &mut rng());
    let position = car.position();
    let world = World::with_obstacles(&params, vec![block(position.x, position.y)]);

    car.update(&world, &params);

    assert!(!car.is_alive());
    assert_eq!(car.death_cause(), Some(DeathCause::Obstacle));
    let frozen = *car.state();
    let CarState::Dead(wreck) = frozen else {
        panic!("car should be dead");
    };
    assert_eq!(wreck.ticks, 1);

    car.update(&world, &params);
    assert_eq!(*car.state(), frozen);
}

#[test]
fn test_death_by_lane_exit() {
    let params = Params {
        arena_width: 38.0,
        ..create_test_params()
    };
    let world = empty_world(&params);
    let mut car = Car::spawn(&params, 1, &mut rng());

    car.update(&world, &params);

    assert_eq!(car.death_cause(), Some(DeathCause::LaneExit));
}

#[test]
fn test_middle_sensor_faces_forward() {
    let params = Params::default();
    let car = Car::spawn(&params, 1, &mut rng());

    let middle = &car.sensors()[params.sensor_count / 2];
    assert!(middle.base_angle().abs() < 1e-6);
}

#[test]
fn test_proximity_penalty() {
    let params = create_test_params();
    let mut car = Car::spawn(&params, 1, &mut rng());
    let position = car.position();

    // 40 units ahead of the sensor origin, 5 units clear of the car's nose
    let world = World::with_obstacles(&params, vec![block(position.x, position.y - 60.0)]);

    car.update(&world, &params);

    assert!(car.is_alive());
    let middle = &car.sensors()[params.sensor_count / 2];
    assert!((middle.distance() - 40.0).abs() < 1e-3);
    assert!((car.fitness() - (params.car_speed - params.proximity_penalty)).abs() < 1e-5);
}

#[test]
fn test_lane_penalty() {
    let params = Params {
        lane_penalty: 1.0,
        max_steer: 0.2,
        ..create_test_params()
    };
    let world = empty_world(&params);

    for seed in 0..5 {
        let mut car = Car::spawn(&params, 1, &mut Pcg32::seed_from_u64(seed));
        for _ in 0..10 {
            car.update(&world, &params);
        }
        let offset = (car.position().x - params.lane_center()).abs() / (params.arena_width / 2.0);
        assert!(car.fitness() <= 10.0 * params.car_speed);
        if offset > 1e-3 {
            assert!(car.fitness() < 10.0 * params.car_speed);
        }
    }
}

#[test]
fn test_retire() {
    let params = create_test_params();
    let world = empty_world(&params);
    let mut car = Car::spawn(&params, 1, &mut rng());

    car.update(&world, &params);
    car.retire();

    assert_eq!(car.death_cause(), Some(DeathCause::TickLimit));
    assert_eq!(car.fitness(), params.car_speed);

    // retiring a dead car keeps the first cause
    car.retire();
    assert_eq!(car.death_cause(), Some(DeathCause::TickLimit));
}

#[test]
fn test_clone_genotype_resets_runtime_state() {
    let params = create_test_params();
    let mut car = Car::spawn(&params, 4, &mut rng());
    let world = World::with_obstacles(&params, vec![block(car.position().x, car.position().y)]);
    car.update(&world, &params);
    assert!(!car.is_alive());

    let copy = car.clone_genotype();

    assert!(copy.is_alive());
    assert_eq!(copy.fitness(), 0.0);
    assert_eq!(copy.ticks(), 0);
    assert_eq!(copy.generation(), 4);
    assert_eq!(copy.brain(), car.brain());
    assert_eq!(copy.tagged(5).generation(), 5);
}

#[test]
fn test_mutating_copy_leaves_original() {
    let params = create_test_params();
    let mut rng = rng();
    let car = Car::spawn(&params, 1, &mut rng);
    let mut copy = car.clone_genotype();

    copy.mutate(1.0, 0.5, &mut rng);

    assert_ne!(copy.brain(), car.brain());
}

#[test]
fn test_with_controller_checked() {
    let params = create_test_params();
    let mut rng = rng();
    let car = Car::spawn(&params, 1, &mut rng);

    let wrong = NeuralNetwork::random(&[2, 1], 1.0, &mut rng);
    assert!(matches!(
        car.with_controller_checked(wrong),
        Err(SimError::ShapeMismatch { .. })
    ));

    let right = NeuralNetwork::random(&params.layer_sizes(), 1.0, &mut rng);
    let swapped = car.with_controller_checked(right.clone()).unwrap();
    assert_eq!(swapped.brain(), &right);
}

#[test]
fn test_view_reports_rays() {
    let params = create_test_params();
    let world = empty_world(&params);
    let mut car = Car::spawn(&params, 2, &mut rng());
    car.update(&world, &params);

    let view = car.view();

    assert!(view.alive);
    assert_eq!(view.generation, 2);
    assert_eq!(view.rays.len(), params.sensor_count);
    assert!(view.rays.iter().all(|ray| ray.hit.is_none()));
}
