#![allow(dead_code)]

use skyline::body::Body;
use skyline::calculator::{HorizonCalculator, HorizonModel};
use skyline::constants::{Degree, Meter};
use skyline::observer::Observer;
use skyline::params::HorizonParams;
use skyline::projection::wrap_longitude;
use skyline::raster::{FunctionSource, Resolution};

/// Radius used by the flat-sphere scenarios.
pub const TEST_EARTH_RADIUS: Meter = 6.378e6;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_earth() -> Body {
    Body::new("Earth", TEST_EARTH_RADIUS, 0.5, 2.0).unwrap()
}

/// Featureless terrain at a constant elevation.
pub fn flat_source(
    resolution: Degree,
    elevation: Meter,
) -> FunctionSource<impl Fn(Degree, Degree) -> Meter> {
    FunctionSource::new(Resolution::uniform(resolution), move |_, _| elevation)
}

/// Gaussian ridge of `height` meters following the meridian `crest_lon`, `width` degrees wide.
pub fn ridge_source(
    resolution: Degree,
    crest_lon: Degree,
    width: Degree,
    height: Meter,
) -> FunctionSource<impl Fn(Degree, Degree) -> Meter> {
    FunctionSource::new(Resolution::uniform(resolution), move |lon, _| {
        let d = wrap_longitude(lon - crest_lon);
        height * (-(d / width).powi(2)).exp()
    })
}

/// Terrain rising linearly towards the north.
pub fn tilted_source(
    resolution: Degree,
    slope_per_degree: Meter,
) -> FunctionSource<impl Fn(Degree, Degree) -> Meter> {
    FunctionSource::new(Resolution::uniform(resolution), move |_, lat| {
        1000.0 + slope_per_degree * lat
    })
}

pub fn prepare<F>(
    observer: Observer,
    body: Body,
    params: HorizonParams,
    source: FunctionSource<F>,
) -> HorizonModel
where
    F: Fn(Degree, Degree) -> Meter,
{
    HorizonCalculator::new(observer, body, params, source)
        .unwrap()
        .prepare()
        .unwrap()
}
