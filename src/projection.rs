//! # Coordinate projector
//!
//! Great-circle geometry on a sphere, expressed relative to an observer:
//!
//! - [`project`](crate::projection::project) – absolute `(lon, lat)` of the point reached by
//!   travelling an angular distance `γ` along azimuth `α` (0 = north, clockwise).
//! - [`angular_distance`](crate::projection::angular_distance) and
//!   [`initial_azimuth`](crate::projection::initial_azimuth) – the inverse problem.
//! - Longitude folding helpers used by the bounding-box resolver and the interpolator.
//!
//! The forward formula works in colatitude `θ₀ = π/2 − lat₀`:
//!
//! ```text
//! θ = arccos(cos θ₀·cos γ + cos α·sin θ₀·sin γ)
//! φ = arg[(sin θ₀·cos γ + i·sin α·sin γ − cos α·cos θ₀·sin γ)·e^{iφ₀}]
//! ```
//!
//! The complex argument is evaluated as an `atan2` of the rotated components, so the output
//! longitude lies in (-180°, 180°]. No ellipsoidal correction is applied.

use crate::constants::{Degree, Radian, DEGRAD, DPI, RADEG};
use crate::observer::Observer;

/// Destination point from an observer.
///
/// Arguments
/// -----------------
/// * `observer`: the origin of the ray.
/// * `alpha`: azimuth in **radians**, 0 = north, increasing clockwise.
/// * `gamma`: angular distance in **radians**, within [0, π].
///
/// Return
/// ----------
/// * `(longitude, latitude)` in **degrees**. For `gamma == 0` the observer's own coordinates
///   are returned unchanged, whatever `alpha` is (this also covers observers standing on a pole,
///   where the complex argument is undefined).
pub fn project(observer: &Observer, alpha: Radian, gamma: Radian) -> (Degree, Degree) {
    destination_point(observer.longitude(), observer.latitude(), alpha, gamma)
}

/// Same as [`project`] from raw `(lon0, lat0)` coordinates in degrees.
pub fn destination_point(
    lon0: Degree,
    lat0: Degree,
    alpha: Radian,
    gamma: Radian,
) -> (Degree, Degree) {
    if gamma == 0.0 {
        return (lon0, lat0);
    }

    let theta_0 = std::f64::consts::FRAC_PI_2 - lat0 * RADEG;
    let phi_0 = lon0 * RADEG;

    let (sin_t0, cos_t0) = theta_0.sin_cos();
    let (sin_g, cos_g) = gamma.sin_cos();
    let (sin_a, cos_a) = alpha.sin_cos();

    let cos_theta = (cos_t0 * cos_g + cos_a * sin_t0 * sin_g).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();

    // (re + i·im)·e^{iφ₀}
    let re = sin_t0 * cos_g - cos_a * cos_t0 * sin_g;
    let im = sin_a * sin_g;
    let (sin_p0, cos_p0) = phi_0.sin_cos();
    let phi = (re * sin_p0 + im * cos_p0).atan2(re * cos_p0 - im * sin_p0);

    (phi * DEGRAD, 90.0 - theta * DEGRAD)
}

/// Great-circle angular separation between two points, haversine form.
///
/// Arguments
/// -----------------
/// * `lon1`, `lat1`: first point in **degrees**.
/// * `lon2`, `lat2`: second point in **degrees**.
///
/// Return
/// ----------
/// * The angular distance in **radians**, within [0, π].
pub fn angular_distance(lon1: Degree, lat1: Degree, lon2: Degree, lat2: Degree) -> Radian {
    let (phi1, phi2) = (lat1 * RADEG, lat2 * RADEG);
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1) * RADEG;

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Initial bearing of the great circle going from point 1 to point 2.
///
/// Return
/// ----------
/// * The azimuth in **radians** within [0, 2π), 0 = north, clockwise.
pub fn initial_azimuth(lon1: Degree, lat1: Degree, lon2: Degree, lat2: Degree) -> Radian {
    let (phi1, phi2) = (lat1 * RADEG, lat2 * RADEG);
    let dlambda = (lon2 - lon1) * RADEG;

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    y.atan2(x).rem_euclid(DPI)
}

/// Fold a longitude into [-180°, 180°).
#[inline]
pub fn wrap_longitude(lon: Degree) -> Degree {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Fold a longitude into [0°, 360°).
#[inline]
pub fn fold_longitude_360(lon: Degree) -> Degree {
    lon.rem_euclid(360.0)
}

/// Signed offset of `lon` from `reference`, folded into [-180°, 180°).
#[inline]
pub fn longitude_offset(lon: Degree, reference: Degree) -> Degree {
    wrap_longitude(lon - reference)
}

#[cfg(test)]
mod projection_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn observer(lon: f64, lat: f64) -> Observer {
        Observer::new(lon, lat, None).unwrap()
    }

    #[test]
    fn test_zero_distance_is_identity() {
        for (lon, lat) in [(0.0, 0.0), (-79.823038, 38.433727), (132.4, -75.0), (45.0, 90.0)] {
            let obs = observer(lon, lat);
            for k in 0..16 {
                let alpha = k as f64 * DPI / 16.0;
                assert_eq!(project(&obs, alpha, 0.0), (lon, lat));
            }
        }
    }

    #[test]
    fn test_tiny_distance_stays_close() {
        let obs = observer(21.375833, -30.833611);
        let (lon, lat) = project(&obs, 1.3, 1e-10);
        assert_abs_diff_eq!(lon, obs.longitude(), epsilon = 1e-6);
        assert_abs_diff_eq!(lat, obs.latitude(), epsilon = 1e-6);
    }

    #[test]
    fn test_cardinal_directions_from_equator() {
        let obs = observer(0.0, 0.0);
        let g = 10.0 * RADEG;

        let (lon, lat) = project(&obs, 0.0, g);
        assert_abs_diff_eq!(lon, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lat, 10.0, epsilon = 1e-10);

        let (lon, lat) = project(&obs, std::f64::consts::FRAC_PI_2, g);
        assert_relative_eq!(lon, 10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-10);

        let (lon, lat) = project(&obs, std::f64::consts::PI, g);
        assert_abs_diff_eq!(lon, 0.0, epsilon = 1e-10);
        assert_relative_eq!(lat, -10.0, epsilon = 1e-10);

        let (lon, lat) = project(&obs, 1.5 * std::f64::consts::PI, g);
        assert_relative_eq!(lon, -10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_crossing_the_antimeridian() {
        let obs = observer(179.0, 0.0);
        let (lon, lat) = project(&obs, std::f64::consts::FRAC_PI_2, 2.0 * RADEG);
        assert_relative_eq!(lon, -179.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_over_the_pole() {
        let obs = observer(30.0, 89.0);
        let (lon, lat) = project(&obs, 0.0, 2.0 * RADEG);
        assert_relative_eq!(lat, 89.0, epsilon = 1e-9);
        assert_relative_eq!(lon, -150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_distance_and_azimuth() {
        let gamma_max = 8.0 * RADEG;
        for (lon0, lat0) in [(132.4, -75.0), (-79.823038, 38.433727), (179.9, 10.0)] {
            for k in 0..36 {
                let alpha = k as f64 * 10.0 * RADEG + 0.1;
                let (lon, lat) = destination_point(lon0, lat0, alpha, gamma_max);
                assert_relative_eq!(
                    angular_distance(lon0, lat0, lon, lat),
                    gamma_max,
                    epsilon = 1e-10
                );
                assert_abs_diff_eq!(
                    initial_azimuth(lon0, lat0, lon, lat),
                    alpha,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_longitude_folding() {
        assert_eq!(wrap_longitude(180.0), -180.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(fold_longitude_360(-10.0), 350.0);
        assert_eq!(longitude_offset(-179.0, 179.0), 2.0);
        assert_eq!(longitude_offset(179.0, -179.0), -2.0);
    }
}
