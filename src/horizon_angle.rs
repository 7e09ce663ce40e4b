//! # Horizon angle model
//!
//! Apparent elevation angle of a terrain point seen from the observer, on a spherical body.
//!
//! With `R` the body radius, `E_obs` the observer elevation (ground + instrument height), `h` the
//! terrain elevation at angular distance `γ`, the two points sit at radii `R + E_obs` and `R + h`.
//! The angle above the observer's local horizontal is
//!
//! ```text
//! η = atan( cot γ − ((R + E_obs) / (R + h)) / sin γ )
//! ```
//!
//! `cot γ` diverges at `γ = 0`: callers must sample from a strictly positive `gamma_min`.
//!
//! Two closed forms are handy to check the model on a featureless sphere:
//!
//! * observer on the ground, flat terrain: `η = −γ / 2` ([`curvature_dip`]);
//! * observer `H` meters up, flat terrain: the skyline is the tangent point, at
//!   `η = −acos(R / (R + H))` ([`geometric_horizon_dip`]).

use crate::constants::{Meter, Radian};

/// Horizon angle of a terrain point, in **radians**.
///
/// Arguments
/// -----------------
/// * `observer_elevation`: ground elevation at the observer plus instrument height, meters.
/// * `terrain_elevation`: elevation of the terrain point, meters.
/// * `gamma`: angular distance between the observer and the point, radians, `0 < γ ≤ π`.
/// * `radius`: body radius, meters.
///
/// Return
/// ----------
/// * `η` in (−π/2, π/2). Not finite for `γ = 0`.
#[inline]
pub fn horizon_angle(
    observer_elevation: Meter,
    terrain_elevation: Meter,
    gamma: Radian,
    radius: Meter,
) -> Radian {
    let (sin_g, cos_g) = gamma.sin_cos();
    let ratio = (radius + observer_elevation) / (radius + terrain_elevation);
    ((cos_g - ratio) / sin_g).atan()
}

/// Horizon angle of flat terrain seen from the ground at angular distance `gamma`: `−γ/2`.
#[inline]
pub fn curvature_dip(gamma: Radian) -> Radian {
    -0.5 * gamma
}

/// Depression of the tangent horizon for an instrument `height` meters above a flat sphere.
#[inline]
pub fn geometric_horizon_dip(radius: Meter, height: Meter) -> Radian {
    -(radius / (radius + height)).acos()
}

#[cfg(test)]
mod horizon_angle_test {
    use super::*;
    use crate::constants::RADEG;
    use approx::assert_relative_eq;

    const R: f64 = 6.378e6;

    #[test]
    fn test_flat_ground_matches_curvature_dip() {
        for gamma_deg in [0.005, 0.1, 0.5, 2.0, 30.0] {
            let g = gamma_deg * RADEG;
            assert_relative_eq!(horizon_angle(0.0, 0.0, g, R), curvature_dip(g), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_raised_observer_dips_further() {
        for gamma_deg in [0.005, 0.1, 0.5] {
            let g = gamma_deg * RADEG;
            assert!(horizon_angle(100.0, 0.0, g, R) < horizon_angle(0.0, 0.0, g, R));
        }
    }

    #[test]
    fn test_tangent_point_is_the_maximum() {
        let height = 100.0;
        let dip = geometric_horizon_dip(R, height);
        let tangent = -dip;

        let at_tangent = horizon_angle(height, 0.0, tangent, R);
        assert_relative_eq!(at_tangent, dip, epsilon = 1e-12);
        assert!(horizon_angle(height, 0.0, 0.5 * tangent, R) < at_tangent);
        assert!(horizon_angle(height, 0.0, 2.0 * tangent, R) < at_tangent);
    }

    #[test]
    fn test_curvature_shrinks_with_radius() {
        let g = 0.3 * RADEG;
        let mut previous = f64::INFINITY;
        for radius in [1.7374e6, 3.3895e6, 6.378e6, 7.0e7] {
            let dip = horizon_angle(50.0, 0.0, g, radius).abs();
            assert!(dip.is_finite());
            assert!(dip < previous);
            previous = dip;
        }
    }

    #[test]
    fn test_nearby_peak_is_above_horizontal() {
        // 1 km high at 0.01 deg (~1.1 km) on Earth
        let eta = horizon_angle(0.0, 1000.0, 0.01 * RADEG, R);
        assert!(eta > 40.0 * RADEG && eta < 45.0 * RADEG);
    }
}
