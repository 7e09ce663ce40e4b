mod common;

use nalgebra::DMatrix;
use skyline::body::Body;
use skyline::calculator::HorizonCalculator;
use skyline::constants::DEGRAD;
use skyline::observer::{sites, Observer};
use skyline::params::HorizonParams;
use skyline::projection::angular_distance;
use skyline::raster::lunar::GlobalRaster;

use crate::common::init_logger;

const PPD: u32 = 8;

/// Global 8 px/deg raster with a 2 km ring wall of 1° radius around the Schrödinger site.
fn crater_raster() -> GlobalRaster {
    let (clon, clat) = sites::SCHRODINGER;
    let res = 1.0 / PPD as f64;
    let samples = DMatrix::from_fn(180 * PPD as usize, 360 * PPD as usize, |r, c| {
        let lat = 90.0 - (r as f64 + 0.5) * res;
        let lon = -180.0 + (c as f64 + 0.5) * res;
        let d = angular_distance(clon, clat, lon, lat) * DEGRAD;
        2000.0 * (-((d - 1.0) / 0.3).powi(2)).exp()
    });
    GlobalRaster::new(samples, PPD, 90.0, -180.0).unwrap()
}

#[test]
fn crater_walls_surround_the_observer() {
    init_logger();
    let (lon, lat) = sites::SCHRODINGER;
    let observer = Observer::new(lon, lat, Some("Schrödinger".into())).unwrap();
    let params = HorizonParams::builder_for(&Body::moon())
        .record_gamma(true)
        .build()
        .unwrap();

    let model = HorizonCalculator::new(observer, Body::moon(), params, crater_raster())
        .unwrap()
        .prepare()
        .unwrap();
    assert!(!model.bounding_box().includes_pole);

    let profile = model.profile(24 + 1, 400).unwrap();
    for p in &profile {
        assert!(p.horizon_angle > 1.0, "{p:?}");
        let gamma = p.gamma.unwrap();
        assert!((gamma - 1.0).abs() < 0.3, "{p:?}");
    }

    let spread = profile.max().unwrap().horizon_angle - profile.min().unwrap().horizon_angle;
    assert!(spread < 0.5);
}

#[test]
fn polar_observer_uses_a_full_circle_box() {
    init_logger();
    let observer = Observer::new(-45.0, -88.0, None).unwrap();
    let params = HorizonParams::builder_for(&Body::moon()).build().unwrap();
    let model = HorizonCalculator::new(observer, Body::moon(), params, crater_raster())
        .unwrap()
        .prepare()
        .unwrap();

    let bbox = model.bounding_box();
    assert!(bbox.includes_pole);
    assert!(bbox.is_full_circle());
    assert_eq!(bbox.south, -90.0);

    let profile = model.profile(37, 100).unwrap();
    assert_eq!(profile.len(), 37);
    assert!(profile.iter().all(|p| p.horizon_angle.is_finite()));
}
