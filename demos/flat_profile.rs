//! Horizon profile of a synthetic scene: an observer on a flat sphere, 30 m above the ground,
//! with an isolated 600 m hill to the north-east.
//!
//! ```text
//! RUST_LOG=info cargo run --example flat_profile
//! ```

use skyline::body::Body;
use skyline::calculator::HorizonCalculator;
use skyline::horizon_errors::HorizonError;
use skyline::observer::Observer;
use skyline::params::HorizonParams;
use skyline::raster::{FunctionSource, Resolution};

fn main() -> Result<(), HorizonError> {
    env_logger::init();

    let hill = |lon: f64, lat: f64| {
        let d2 = (lon - 0.15).powi(2) + (lat - 0.15).powi(2);
        600.0 * (-d2 / 0.002).exp()
    };
    let source = FunctionSource::new(Resolution::uniform(0.005), hill);

    let observer = Observer::with_height(0.0, 0.0, 30.0, Some("demo".into()))?;
    let params = HorizonParams::builder()
        .n_alpha(73)
        .n_gamma(500)
        .record_gamma(true)
        .build()?;
    println!("{params:#}");

    let model = HorizonCalculator::new(observer, Body::earth(), params, source)?.prepare()?;
    let profile = model.default_profile()?;

    println!("{:>8}  {:>10}  {:>8}", "az [deg]", "eta [deg]", "γ [deg]");
    for p in &profile {
        println!(
            "{:>8.1}  {:>10.4}  {:>8.4}",
            p.azimuth,
            p.horizon_angle,
            p.gamma.unwrap_or(f64::NAN)
        );
    }
    if let Some(top) = profile.max() {
        println!("\nhighest skyline point: {:.3}° at azimuth {:.1}°", top.horizon_angle, top.azimuth);
    }
    Ok(())
}
