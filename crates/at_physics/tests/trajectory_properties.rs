// crates/at_physics/tests/trajectory_properties.rs

//! 轨迹计算的整体性质

mod common;

use std::sync::Arc;

use at_config::{RunConfig, StartLocation, TurbulenceConfig, VerticalMotionConfig};
use at_physics::prelude::*;
use at_physics::{AdaptiveStepController, BoundaryHandler};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{sheared_field, uniform_field};

fn config(hours: f64) -> RunConfig {
    RunConfig {
        total_run_hours: hours,
        ..Default::default()
    }
}

fn run_one(field: &GriddedField, cfg: &RunConfig, source: StartLocation) -> Trajectory {
    let engine = TrajectoryEngine::new(field, cfg).unwrap();
    engine.run_source(0, &source).unwrap()
}

#[test]
fn test_uniform_wind_one_hour() {
    let field = uniform_field(DVec3::new(10.0, 0.0, 0.0));
    let engine = TrajectoryEngine::new(&field, &config(1.0)).unwrap();
    let results = engine.run(&[StartLocation::new(0.0, 0.0, 500.0)]);
    let traj = results[0].as_ref().unwrap();

    assert_eq!(traj.status, TrajectoryStatus::CompletedNormally);
    let end = traj.current();
    assert!((end.lon - 0.324).abs() < 1e-3);
    assert_eq!(end.lat, 0.0);
    assert_eq!(end.z, 500.0);
}

#[test]
fn test_time_is_monotonic_forward() {
    let field = sheared_field();
    let traj = run_one(&field, &config(2.0), StartLocation::new(-3.0, 2.0, 1000.0));
    assert_eq!(traj.status, TrajectoryStatus::CompletedNormally);
    for pair in traj.path.windows(2) {
        assert!(pair[1].time > pair[0].time);
    }
    assert_eq!(traj.current().time, 7200.0);
}

#[test]
fn test_time_is_monotonic_backward() {
    let field = sheared_field();
    let traj = run_one(&field, &config(-2.0), StartLocation::new(3.0, -2.0, 1000.0));
    assert_eq!(traj.status, TrajectoryStatus::CompletedNormally);
    assert_eq!(traj.path[0].time, 7200.0);
    for pair in traj.path.windows(2) {
        assert!(pair[1].time < pair[0].time);
    }
    assert_eq!(traj.current().time, 0.0);
}

#[test]
fn test_forward_then_backward_returns_to_origin() {
    let field = sheared_field();
    let origin = StartLocation::new(-2.0, 1.0, 1000.0);
    let forward = run_one(&field, &config(2.0), origin);
    assert_eq!(forward.status, TrajectoryStatus::CompletedNormally);

    let end = forward.current();
    let back_source = StartLocation::new(end.lon, end.lat, end.z).at_time(end.time);
    let backward = run_one(&field, &config(-2.0), back_source);
    assert_eq!(backward.status, TrajectoryStatus::CompletedNormally);

    let home = backward.current();
    assert!((home.lon - origin.lon).abs() < 0.5);
    assert!((home.lat - origin.lat).abs() < 0.5);
    assert!((home.z - origin.z).abs() < 1.0);
    assert_eq!(home.time, 0.0);
}

#[test]
fn test_sources_are_independent() {
    let field = sheared_field();
    let mut cfg = config(2.0);
    cfg.turbulence = TurbulenceConfig::enabled_with_seed(7);
    let engine = TrajectoryEngine::new(&field, &cfg).unwrap();

    let a = StartLocation::new(-4.0, 0.0, 800.0);
    let b = StartLocation::new(2.0, 3.0, 1500.0);
    let together = engine.run(&[a, b]);
    let alone = engine.run(&[b]);

    let t = together[1].as_ref().unwrap();
    let s = alone[0].as_ref().unwrap();
    assert_eq!(t.path, s.path);
    assert_eq!(t.status, s.status);
}

#[test]
fn test_isobaric_keeps_level() {
    let field = uniform_field(DVec3::new(3.0, -2.0, 0.5));
    let mut cfg = config(2.0);
    cfg.vertical_motion = VerticalMotionConfig::Isobaric;
    let traj = run_one(&field, &cfg, StartLocation::new(0.0, 0.0, 1000.0));
    assert_eq!(traj.status, TrajectoryStatus::CompletedNormally);
    assert!(traj.path.iter().all(|p| p.z == 1000.0));
}

#[test]
fn test_disabled_turbulence_is_deterministic() {
    let field = sheared_field();
    let source = StartLocation::new(0.0, 0.0, 1200.0);
    let first = run_one(&field, &config(2.0), source);
    let second = run_one(&field, &config(2.0), source);
    assert_eq!(first, second);
}

#[test]
fn test_turbulence_seeded_streams() {
    let field = sheared_field();
    let source = StartLocation::new(0.0, 0.0, 600.0);

    let mut cfg = config(2.0);
    cfg.turbulence = TurbulenceConfig::enabled_with_seed(11);
    let first = run_one(&field, &cfg, source);
    let second = run_one(&field, &cfg, source);
    assert_eq!(first.path, second.path);

    cfg.turbulence = TurbulenceConfig::enabled_with_seed(12);
    let other = run_one(&field, &cfg, source);
    assert_ne!(first.path, other.path);

    let calm = run_one(&field, &config(2.0), source);
    assert_ne!(first.path, calm.path);
}

#[test]
fn test_boundary_handler_bounds() {
    let handler = BoundaryHandler::new(10_000.0);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5000 {
        let lon = rng.gen_range(-400.0..400.0);
        let lat = rng.gen_range(-200.0..200.0);
        let z = rng.gen_range(-5000.0..20_000.0);
        let lower = rng.gen_range(0.0..1000.0);
        let upper = rng.gen_range(5000.0..10_000.0);

        let out = handler.apply_within(lon, lat, z, lower, upper);
        assert!((-90.0..=90.0).contains(&out.lat), "lat {}", out.lat);
        assert!((-180.0..=180.0).contains(&out.lon), "lon {}", out.lon);
        assert!(out.z >= lower && out.z <= upper, "z {} not in [{}, {}]", out.z, lower, upper);
    }
}

#[test]
fn test_compute_dt_bounds() {
    let field = uniform_field(DVec3::ZERO);
    let ctrl = AdaptiveStepController::new(0.75, 1800.0, 1e-3);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..2000 {
        let wind = DVec3::new(
            rng.gen_range(-80.0..80.0),
            rng.gen_range(-80.0..80.0),
            rng.gen_range(-2.0..2.0),
        );
        let pos = ParcelPosition::new(
            rng.gen_range(0.0..7000.0),
            rng.gen_range(-9.0..9.0),
            rng.gen_range(-9.0..9.0),
            rng.gen_range(0.0..5000.0),
        );
        let (dx, dy, dz) = ctrl.local_spacing(&field, &pos);
        let mut cfl_limit = f64::INFINITY;
        for (spacing, speed) in [(dx, wind.x), (dy, wind.y), (dz, wind.z)] {
            if let Some(spacing) = spacing {
                let bound = 0.75 * spacing / speed.abs().max(1e-3);
                cfl_limit = cfl_limit.min(bound);
            }
        }
        assert!(cfl_limit.is_finite());

        for direction in [1.0, -1.0] {
            let step = ctrl.compute_dt(&field, wind, &pos, direction);
            let size = step.dt.abs();
            assert!(step.dt.is_finite());
            assert!(step.dt * direction > 0.0);
            assert!(size <= 1800.0);
            assert!(size <= cfl_limit * (1.0 + 1e-12), "dt {} > CFL {}", size, cfl_limit);

            let to_node = field.next_time_node(pos.time, direction).map(|node| (node - pos.time).abs());
            if let Some(to_node) = to_node {
                assert!(size <= to_node + 1e-9, "dt {} crosses node {} away", size, to_node);
            }

            // 步长恰为各约束中的最小者
            let expected = [Some(1800.0), Some(cfl_limit), to_node]
                .into_iter()
                .flatten()
                .fold(f64::INFINITY, f64::min);
            assert!((size - expected).abs() <= 1e-9 * expected.max(1.0));

            if let Some(node) = step.target {
                assert!((pos.time + step.dt - node).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn test_invalid_start_reported_per_source() {
    let field = uniform_field(DVec3::new(1.0, 0.0, 0.0));
    let engine = TrajectoryEngine::new(&field, &config(1.0)).unwrap();
    let results = engine.run(&[
        StartLocation::new(0.0, 0.0, 500.0),
        StartLocation::new(0.0, 0.0, 9000.0),
        StartLocation::new(30.0, 0.0, 500.0),
    ]);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(TrajectoryError::InvalidCoordinate { .. })));
    assert!(matches!(results[2], Err(TrajectoryError::Boundary { .. })));
}

#[test]
fn test_leaving_domain_stops_only_that_source() {
    let field = uniform_field(DVec3::new(40.0, 0.0, 0.0));
    let engine = TrajectoryEngine::new(&field, &config(2.0)).unwrap();
    let results = engine.run(&[
        StartLocation::new(9.0, 0.0, 500.0),
        StartLocation::new(-9.0, 0.0, 500.0),
    ]);
    let escaped = results[0].as_ref().unwrap();
    let stayed = results[1].as_ref().unwrap();
    assert_eq!(escaped.status, TrajectoryStatus::BoundaryError);
    assert_eq!(stayed.status, TrajectoryStatus::CompletedNormally);
    assert!(escaped.path.iter().all(|p| p.lon <= 10.0));
}

#[test]
fn test_extent_tracker_sees_every_step() {
    let field = uniform_field(DVec3::new(6.0, 8.0, 0.0));
    let tracker = Arc::new(ExtentTracker::new());
    let engine = TrajectoryEngine::new(&field, &config(2.0))
        .unwrap()
        .with_observer(tracker.clone());
    let traj = engine.run_source(0, &StartLocation::new(0.0, 0.0, 500.0)).unwrap();

    let extent = tracker.extent().unwrap();
    assert_eq!(extent.samples, traj.steps);
    assert!((extent.max_wind_speed - 10.0).abs() < 1e-12);
    assert!(extent.lon_max > 0.0 && extent.lat_max > 0.0);
}
