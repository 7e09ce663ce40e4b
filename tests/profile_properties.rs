mod common;

use approx::assert_relative_eq;
use skyline::body::Body;
use skyline::bounding_box::resolve_bounding_box;
use skyline::constants::{DEGRAD, RADEG};
use skyline::observer::{sites, Observer};
use skyline::params::HorizonParams;
use skyline::projection::{angular_distance, initial_azimuth, project};

use crate::common::{init_logger, prepare, ridge_source, test_earth, tilted_source};

#[test]
fn azimuths_span_the_full_circle() {
    init_logger();
    let observer = Observer::new(sites::REACH.0, sites::REACH.1, Some("REACH".into())).unwrap();
    let model = prepare(
        observer,
        Body::earth(),
        HorizonParams::default(),
        tilted_source(0.02, 500.0),
    );

    for n_alpha in [2, 5, 361] {
        let profile = model.profile(n_alpha, 50).unwrap();
        let az = profile.azimuths();
        assert_eq!(az.len(), n_alpha);
        assert_eq!(az[0], 0.0);
        assert_eq!(az[n_alpha - 1], 360.0);
        assert!(az.windows(2).all(|w| w[1] > w[0]));
    }
}

#[test]
fn maximum_matches_brute_force() {
    init_logger();
    let observer = Observer::new(10.0, 20.0, None).unwrap();
    let params = HorizonParams::builder().record_gamma(true).build().unwrap();
    let model = prepare(observer, test_earth(), params, ridge_source(0.01, 10.25, 0.05, 800.0));

    let n_gamma = 25;
    let gammas = model.gamma_samples(n_gamma);
    let profile = model.profile(25, n_gamma).unwrap();

    for p in &profile {
        let (best_idx, best) = gammas
            .iter()
            .map(|g| model.horizon_angle(p.azimuth * RADEG, g * RADEG) * DEGRAD)
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, b), (i, eta)| {
                if eta > b {
                    (i, eta)
                } else {
                    (bi, b)
                }
            });
        assert_eq!(p.horizon_angle, best);
        assert_eq!(p.gamma, Some(gammas[best_idx]));
    }
}

#[test]
fn tilted_terrain_rises_to_the_north() {
    let observer = Observer::new(0.0, 0.0, None).unwrap();
    let model = prepare(
        observer,
        test_earth(),
        HorizonParams::default(),
        tilted_source(0.02, 2000.0),
    );
    let profile = model.profile(5, 200).unwrap();
    let angles = profile.horizon_angles();

    // 0 = north, 90 = east, 180 = south
    assert!(angles[0] > 0.0);
    assert!(angles[2] < 0.0);
    assert!(angles[0] > angles[1] && angles[1] > angles[2]);
    assert_relative_eq!(angles[1], angles[3], epsilon = 1e-6);
}

#[test]
fn ridge_across_the_antimeridian() {
    init_logger();
    let observer = Observer::new(179.9, -10.0, None).unwrap();
    let model = prepare(
        observer,
        test_earth(),
        HorizonParams::default(),
        ridge_source(0.01, -179.8, 0.04, 500.0),
    );
    assert!(model.bounding_box().straddles_antimeridian());

    let profile = model.profile(5, 400).unwrap();
    let east = profile.points()[1];
    let west = profile.points()[3];
    assert_eq!(east.azimuth, 90.0);
    assert!(east.horizon_angle > 0.5, "east horizon {}", east.horizon_angle);
    assert!(west.horizon_angle < 0.0);
}

#[test]
fn projection_round_trip() {
    let gamma_max = 8.0 * RADEG;
    for (lon, lat) in [sites::CTP, sites::EDGES, sites::REACH, sites::SCHRODINGER, (179.9, 89.0)] {
        let observer = Observer::new(lon, lat, None).unwrap();
        for k in 0..12 {
            let alpha = k as f64 * 30.0 * RADEG;
            let (plon, plat) = project(&observer, alpha, gamma_max);
            assert_relative_eq!(angular_distance(lon, lat, plon, plat), gamma_max, epsilon = 1e-9);

            if lat.abs() < 85.0 {
                let back = initial_azimuth(lon, lat, plon, plat);
                let diff = (back - alpha).rem_euclid(std::f64::consts::TAU);
                assert!(diff < 1e-9 || diff > std::f64::consts::TAU - 1e-9);
            }
        }
    }
}

#[test]
fn swept_box_contains_the_search_disc() {
    for (lon, lat) in [sites::CTP, sites::EDGES, (179.7, 60.0), (-179.7, -45.0)] {
        let observer = Observer::new(lon, lat, None).unwrap();
        let bbox = resolve_bounding_box(&observer, 2.0, &Default::default()).unwrap();
        assert!(bbox.south >= -90.0 && bbox.north <= 90.0);

        for k in 0..360 {
            for gamma in [0.5, 1.0, 2.0] {
                let (plon, plat) = project(&observer, k as f64 * RADEG, gamma * RADEG);
                let lat_ok = plat >= bbox.south - 1e-9 && plat <= bbox.north + 1e-9;
                let lon_ok = (plon - bbox.west + 1e-9).rem_euclid(360.0) <= bbox.lon_span() + 2e-9;
                assert!(lat_ok && lon_ok, "({plon}, {plat}) outside {bbox:?}");
            }
        }
    }
}
