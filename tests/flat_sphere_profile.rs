mod common;

use approx::assert_abs_diff_eq;
use skyline::constants::{DEGRAD, RADEG};
use skyline::horizon_angle::{curvature_dip, geometric_horizon_dip};
use skyline::observer::Observer;
use skyline::params::HorizonParams;

use crate::common::{flat_source, init_logger, prepare, test_earth, TEST_EARTH_RADIUS};

fn params() -> HorizonParams {
    HorizonParams::builder()
        .gamma_max(0.5)
        .n_gamma(1000)
        .record_gamma(true)
        .build()
        .unwrap()
}

#[test]
fn flat_sphere_from_the_ground() {
    init_logger();
    let observer = Observer::new(0.0, 0.0, Some("origin".into())).unwrap();
    let model = prepare(observer, test_earth(), params(), flat_source(0.05, 0.0));
    let profile = model.profile(73, 1000).unwrap();

    // curvature only: the nearest sample is the highest one
    let expected = curvature_dip(0.005 * RADEG) * DEGRAD;
    assert!(expected < 0.0);
    for p in &profile {
        assert_abs_diff_eq!(p.horizon_angle, expected, epsilon = 1e-6);
        assert_eq!(p.gamma, Some(0.005));
    }
}

#[test]
fn raised_observer_sees_the_tangent_horizon() {
    init_logger();
    let ground = Observer::new(0.0, 0.0, None).unwrap();
    let raised = Observer::with_height(0.0, 0.0, 100.0, None).unwrap();

    let low = prepare(ground, test_earth(), params(), flat_source(0.05, 0.0))
        .profile(37, 1000)
        .unwrap();
    let model = prepare(raised, test_earth(), params(), flat_source(0.05, 0.0));
    assert_abs_diff_eq!(model.observer_elevation(), 100.0, epsilon = 1e-6);
    let high = model.profile(37, 1000).unwrap();

    let dip = geometric_horizon_dip(TEST_EARTH_RADIUS, 100.0) * DEGRAD;
    for (l, h) in low.iter().zip(high.iter()) {
        assert!(h.horizon_angle < l.horizon_angle);
        assert_abs_diff_eq!(h.horizon_angle, dip, epsilon = 1e-4);
        // tangent point at ~0.32 deg
        assert_abs_diff_eq!(h.gamma.unwrap(), -dip, epsilon = 0.01);
    }
}

#[test]
fn plateau_behaves_like_the_ground() {
    let observer = Observer::new(-79.823038, 38.433727, None).unwrap();
    let model = prepare(observer, test_earth(), params(), flat_source(0.02, 2000.0));
    let profile = model.profile(19, 300).unwrap();

    assert_abs_diff_eq!(model.observer_elevation(), 2000.0, epsilon = 1e-6);
    let expected = curvature_dip(0.005 * RADEG) * DEGRAD;
    for p in &profile {
        assert_abs_diff_eq!(p.horizon_angle, expected, epsilon = 1e-6);
    }
}
