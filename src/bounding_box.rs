//! # Bounding-box resolver
//!
//! Determine the longitude/latitude rectangle of elevation data needed to cover every point the
//! horizon search can reach: all azimuths, angular distances in `[0, gamma_max]`.
//!
//! Two policies are available through [`BoundingBoxPolicy`](crate::bounding_box::BoundingBoxPolicy):
//!
//! * **Fixed width** – observer ± half a configured width on each axis. Cheap, but it does not
//!   account for meridian convergence, so it can under-cover at high latitude. A box whose
//!   latitude band reaches a pole spans 360° of longitude.
//! * **Swept** – the ring at `gamma_max` is sampled every `azimuth_step` degrees and the box is
//!   the envelope of the sampled longitudes. Latitude bounds are `lat ± gamma_max`, clamped to
//!   the poles. When a pole lies inside the search disc, every longitude is reachable and the box
//!   spans 360°.
//!
//! ## Longitude representation
//!
//! A [`BoundingBox`](crate::bounding_box::BoundingBox) stores a **raw contiguous** longitude range
//! `west ≤ east`, which may extend past ±180° (e.g. `175..185`). This keeps antimeridian
//! straddling explicit. [`BoundingBox::normalized_west`](crate::bounding_box::BoundingBox::normalized_west)
//! and [`BoundingBox::normalized_east`](crate::bounding_box::BoundingBox::normalized_east) give the
//! folded values in [-180°, 180°), where `west > east` signals a straddling box.

use itertools::{Itertools, MinMaxResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, DEFAULT_SWEEP_STEP, RADEG};
use crate::horizon_errors::HorizonError;
use crate::observer::Observer;
use crate::projection::{destination_point, longitude_offset, wrap_longitude};

/// How the elevation box is derived from the observer and the search window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingBoxPolicy {
    /// Observer ± half of the given full widths, in degrees.
    FixedWidth {
        lon_width: Degree,
        lat_width: Degree,
    },
    /// Envelope of the `gamma_max` ring sampled every `azimuth_step` degrees.
    Swept { azimuth_step: Degree },
}

impl Default for BoundingBoxPolicy {
    fn default() -> Self {
        BoundingBoxPolicy::Swept {
            azimuth_step: DEFAULT_SWEEP_STEP,
        }
    }
}

/// Longitude/latitude rectangle of required elevation data, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Raw western bound; may be below -180.
    pub west: Degree,
    pub south: Degree,
    /// Raw eastern bound, always `>= west`; may be above 180.
    pub east: Degree,
    pub north: Degree,
    /// `true` iff `south == -90` or `north == 90`.
    pub includes_pole: bool,
}

impl BoundingBox {
    /// Build a box from `(west, south, east, north)`.
    ///
    /// A box given with `west > east` is read as wrapping through the antimeridian, and stored
    /// with `east + 360`.
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] if a latitude is outside [-90, 90], if
    ///   `south > north`, or if the longitude span exceeds 360°.
    pub fn new(
        west: Degree,
        south: Degree,
        east: Degree,
        north: Degree,
    ) -> Result<Self, HorizonError> {
        if [west, south, east, north].iter().any(|v| !v.is_finite()) {
            return Err(HorizonError::InvalidConfiguration(
                "bounding box bounds must be finite".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "bounding box latitudes must lie in [-90, 90], got south={south}, north={north}"
            )));
        }
        if south > north {
            return Err(HorizonError::InvalidConfiguration(format!(
                "bottom boundary {south} cannot be greater than the top boundary {north}"
            )));
        }
        let east = if east < west { east + 360.0 } else { east };
        if east - west > 360.0 {
            return Err(HorizonError::InvalidConfiguration(format!(
                "bounding box spans {} degrees of longitude (> 360)",
                east - west
            )));
        }

        Ok(BoundingBox {
            west,
            south,
            east,
            north,
            includes_pole: south == -90.0 || north == 90.0,
        })
    }

    /// Width of the box in longitude (degrees).
    #[inline]
    pub fn lon_span(&self) -> Degree {
        self.east - self.west
    }

    /// Height of the box in latitude (degrees).
    #[inline]
    pub fn lat_span(&self) -> Degree {
        self.north - self.south
    }

    /// Western bound folded into [-180°, 180°).
    #[inline]
    pub fn normalized_west(&self) -> Degree {
        wrap_longitude(self.west)
    }

    /// Eastern bound folded into [-180°, 180°).
    #[inline]
    pub fn normalized_east(&self) -> Degree {
        wrap_longitude(self.east)
    }

    /// Whether the box crosses the ±180° meridian.
    pub fn straddles_antimeridian(&self) -> bool {
        self.lon_span() < 360.0 && self.normalized_west() + self.lon_span() > 180.0
    }

    /// Whether the box covers every longitude.
    #[inline]
    pub fn is_full_circle(&self) -> bool {
        self.lon_span() >= 360.0
    }

    /// Whether `(lon, lat)` lies inside the box, longitude compared modulo 360°.
    pub fn contains(&self, lon: Degree, lat: Degree) -> bool {
        if lat < self.south || lat > self.north {
            return false;
        }
        self.is_full_circle() || (lon - self.west).rem_euclid(360.0) <= self.lon_span()
    }
}

/// Compute the bounding box of the horizon search.
///
/// Arguments
/// -----------------
/// * `observer`: centre of the search disc.
/// * `gamma_max`: radius of the search disc, in **degrees**.
/// * `policy`: fixed-width or swept box derivation.
///
/// Return
/// ----------
/// * The resolved [`BoundingBox`], latitude clamped to [-90°, 90°].
///
/// Errors
/// ----------
/// * [`HorizonError::InvalidConfiguration`] if `gamma_max` or the policy parameters are not positive.
pub fn resolve_bounding_box(
    observer: &Observer,
    gamma_max: Degree,
    policy: &BoundingBoxPolicy,
) -> Result<BoundingBox, HorizonError> {
    if !(gamma_max > 0.0 && gamma_max < 180.0) {
        return Err(HorizonError::InvalidConfiguration(format!(
            "gamma_max must lie in (0, 180) degrees, got {gamma_max}"
        )));
    }

    let bbox = match *policy {
        BoundingBoxPolicy::FixedWidth {
            lon_width,
            lat_width,
        } => fixed_width_box(observer, gamma_max, lon_width, lat_width)?,
        BoundingBoxPolicy::Swept { azimuth_step } => swept_box(observer, gamma_max, azimuth_step)?,
    };

    debug!(
        "Resolved bounding box west={:.6} south={:.6} east={:.6} north={:.6} (pole: {})",
        bbox.west, bbox.south, bbox.east, bbox.north, bbox.includes_pole
    );
    Ok(bbox)
}

/// Half-width in longitude of the disc of radius `gamma` centred at latitude `lat`, or `None`
/// when the disc contains a pole.
fn longitude_reach(lat: Degree, gamma: Degree) -> Option<Degree> {
    if lat.abs() + gamma >= 90.0 {
        return None;
    }
    let ratio = (gamma * RADEG).sin() / (lat * RADEG).cos();
    Some(ratio.min(1.0).asin() / RADEG)
}

fn fixed_width_box(
    observer: &Observer,
    gamma_max: Degree,
    lon_width: Degree,
    lat_width: Degree,
) -> Result<BoundingBox, HorizonError> {
    if !(lon_width > 0.0 && lon_width <= 360.0) || !(lat_width > 0.0 && lat_width <= 180.0) {
        return Err(HorizonError::InvalidConfiguration(format!(
            "fixed grid widths must lie in (0, 360] x (0, 180], got {lon_width} x {lat_width}"
        )));
    }

    let (lon, lat) = observer.coordinates();
    let south = (lat - lat_width / 2.0).max(-90.0);
    let north = (lat + lat_width / 2.0).min(90.0);

    // meridians converge at a pole: every longitude is inside the box
    if south == -90.0 || north == 90.0 {
        return BoundingBox::new(lon - 180.0, south, lon + 180.0, north);
    }

    match longitude_reach(lat, gamma_max) {
        Some(reach) if reach <= lon_width / 2.0 => {}
        _ => warn!(
            "Fixed-width box of {lon_width} degrees does not cover the full longitude reach of \
             gamma_max={gamma_max} at latitude {lat}; out-of-box samples will be clamped"
        ),
    }

    BoundingBox::new(lon - lon_width / 2.0, south, lon + lon_width / 2.0, north)
}

fn swept_box(
    observer: &Observer,
    gamma_max: Degree,
    azimuth_step: Degree,
) -> Result<BoundingBox, HorizonError> {
    if !(azimuth_step > 0.0 && azimuth_step <= 90.0) {
        return Err(HorizonError::InvalidConfiguration(format!(
            "azimuth_step must lie in (0, 90] degrees, got {azimuth_step}"
        )));
    }

    let (lon0, lat0) = observer.coordinates();
    let south = (lat0 - gamma_max).max(-90.0);
    let north = (lat0 + gamma_max).min(90.0);

    if south == -90.0 || north == 90.0 {
        return BoundingBox::new(lon0 - 180.0, south, lon0 + 180.0, north);
    }

    let n_steps = (360.0 / azimuth_step).ceil() as usize;
    let gamma = gamma_max * RADEG;

    let offsets = (0..n_steps)
        .map(|k| {
            let alpha = (k as f64 * azimuth_step) * RADEG;
            let (lon, _) = destination_point(lon0, lat0, alpha, gamma);
            longitude_offset(lon, lon0)
        })
        .chain(std::iter::once(0.0))
        .minmax_by(|a, b| a.total_cmp(b));

    let (min_off, max_off) = match offsets {
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::NoElements => (0.0, 0.0),
    };

    BoundingBox::new(lon0 + min_off, south, lon0 + max_off, north)
}

#[cfg(test)]
mod bounding_box_test {
    use super::*;
    use approx::assert_relative_eq;

    fn swept() -> BoundingBoxPolicy {
        BoundingBoxPolicy::default()
    }

    #[test]
    fn test_swept_box_at_equator() {
        let obs = Observer::new(10.0, 0.0, None).unwrap();
        let bbox = resolve_bounding_box(&obs, 2.0, &swept()).unwrap();

        assert_relative_eq!(bbox.south, -2.0);
        assert_relative_eq!(bbox.north, 2.0);
        assert_relative_eq!(bbox.west, 8.0, epsilon = 1e-8);
        assert_relative_eq!(bbox.east, 12.0, epsilon = 1e-8);
        assert!(!bbox.includes_pole);
        assert!(!bbox.straddles_antimeridian());
    }

    #[test]
    fn test_swept_box_widens_with_latitude() {
        let obs = Observer::new(0.0, 60.0, None).unwrap();
        let bbox = resolve_bounding_box(&obs, 1.0, &swept()).unwrap();
        let expected = longitude_reach(60.0, 1.0).unwrap();

        assert!(expected > 1.9);
        assert_relative_eq!(bbox.east, expected, epsilon = 1e-6);
        assert_relative_eq!(bbox.west, -expected, epsilon = 1e-6);
    }

    #[test]
    fn test_swept_box_straddling_antimeridian() {
        let obs = Observer::new(179.5, -10.0, None).unwrap();
        let bbox = resolve_bounding_box(&obs, 1.0, &swept()).unwrap();

        assert!(bbox.east > 180.0);
        assert!(bbox.west < 179.5);
        assert!(bbox.straddles_antimeridian());
        assert!(bbox.normalized_west() > bbox.normalized_east());
        assert!(bbox.contains(-179.8, -10.0));
        assert!(bbox.contains(179.0, -10.5));
        assert!(!bbox.contains(170.0, -10.0));
    }

    #[test]
    fn test_swept_box_reaching_the_pole() {
        let obs = Observer::new(132.4, -85.0, None).unwrap();
        let bbox = resolve_bounding_box(&obs, 8.0, &swept()).unwrap();

        assert_eq!(bbox.south, -90.0);
        assert_relative_eq!(bbox.north, -77.0, epsilon = 1e-12);
        assert!(bbox.includes_pole);
        assert!(bbox.is_full_circle());
        assert!(bbox.contains(-47.6, -88.0));
    }

    #[test]
    fn test_pole_flag_iff_bound_is_exactly_a_pole() {
        for (lat, gamma) in [(0.0, 5.0), (80.0, 9.0), (80.0, 10.0), (-75.0, 8.0), (89.0, 0.5)] {
            let obs = Observer::new(0.0, lat, None).unwrap();
            let bbox = resolve_bounding_box(&obs, gamma, &swept()).unwrap();
            assert!(bbox.south >= -90.0 && bbox.north <= 90.0);
            assert_eq!(
                bbox.includes_pole,
                bbox.south == -90.0 || bbox.north == 90.0
            );
        }
    }

    #[test]
    fn test_fixed_width_box() {
        let obs = Observer::new(-79.823038, 38.433727, None).unwrap();
        let policy = BoundingBoxPolicy::FixedWidth {
            lon_width: 2.0,
            lat_width: 2.0,
        };
        let bbox = resolve_bounding_box(&obs, 0.5, &policy).unwrap();

        assert_relative_eq!(bbox.west, -80.823038);
        assert_relative_eq!(bbox.east, -78.823038);
        assert_relative_eq!(bbox.south, 37.433727);
        assert_relative_eq!(bbox.north, 39.433727);
        assert!(!bbox.includes_pole);
    }

    #[test]
    fn test_fixed_width_box_clamped_at_pole() {
        let obs = Observer::new(0.0, 85.0, None).unwrap();
        let policy = BoundingBoxPolicy::FixedWidth {
            lon_width: 20.0,
            lat_width: 20.0,
        };
        let bbox = resolve_bounding_box(&obs, 8.0, &policy).unwrap();
        assert_eq!(bbox.north, 90.0);
        assert_relative_eq!(bbox.south, 75.0);
        assert!(bbox.includes_pole);
        assert!(bbox.is_full_circle());
        assert!(bbox.contains(180.0, 88.0));

        // same longitude extent as the swept policy
        let swept_box = resolve_bounding_box(&obs, 8.0, &swept()).unwrap();
        assert_eq!((bbox.west, bbox.east), (swept_box.west, swept_box.east));
    }

    #[test]
    fn test_wrapping_box_constructor() {
        let bbox = BoundingBox::new(170.0, -5.0, -170.0, 5.0).unwrap();
        assert_eq!(bbox.east, 190.0);
        assert_eq!(bbox.lon_span(), 20.0);
        assert!(bbox.straddles_antimeridian());

        assert!(BoundingBox::new(0.0, 5.0, 1.0, -5.0).is_err());
        assert!(BoundingBox::new(0.0, -95.0, 1.0, 5.0).is_err());
    }

    #[test]
    fn test_invalid_policy_parameters() {
        let obs = Observer::new(0.0, 0.0, None).unwrap();
        let policy = BoundingBoxPolicy::Swept { azimuth_step: 0.0 };
        assert!(resolve_bounding_box(&obs, 1.0, &policy).is_err());
        assert!(resolve_bounding_box(&obs, 0.0, &swept()).is_err());
    }
}
