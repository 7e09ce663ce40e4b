//! # Observer location
//!
//! An [`Observer`](crate::observer::Observer) is the point on the body surface from which the
//! horizon is computed. It is **validated once** at construction and immutable afterwards:
//!
//! - longitude in **[-180°, 180°]** (east positive),
//! - latitude in **[-90°, 90°]**,
//! - height above the local ground in **meters** (≥ 0).
//!
//! The elevation of the observer (ground elevation + height) depends on the terrain, so it is not
//! stored here; it is derived once by [`HorizonModel`](crate::calculator::HorizonModel) from the
//! elevation field.
//!
//! `NotNan<f64>` is used for every field, so an `Observer` can never carry a NaN coordinate and can
//! be used as a hash-map key.
//!
//! ## See also
//! ------------
//! * [`sites`](crate::observer::sites) – Coordinates of a few instrument sites.
//! * [`project`](crate::projection::project) – Destination point from the observer along a ray.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter};
use crate::horizon_errors::HorizonError;

/// Surface location of the observer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observer {
    /// Longitude in **degrees**, east positive.
    longitude: NotNan<f64>,

    /// Latitude in **degrees**.
    latitude: NotNan<f64>,

    /// Height of the instrument above the ground, in **meters**.
    height: NotNan<f64>,

    /// Optional human-readable site name.
    pub name: Option<String>,
}

impl Observer {
    /// Create a new observer standing on the ground.
    ///
    /// Arguments
    /// -----------------
    /// * `longitude`: longitude in **degrees**, within [-180, 180].
    /// * `latitude`: latitude in **degrees**, within [-90, 90].
    /// * `name`: optional site name.
    ///
    /// Return
    /// ----------
    /// * The observer, or [`HorizonError::InvalidConfiguration`] if a coordinate is out of range or NaN.
    pub fn new(
        longitude: Degree,
        latitude: Degree,
        name: Option<String>,
    ) -> Result<Observer, HorizonError> {
        Observer::with_height(longitude, latitude, 0.0, name)
    }

    /// Create a new observer whose instrument is raised `height` meters above the ground.
    ///
    /// Arguments
    /// -----------------
    /// * `longitude`: longitude in **degrees**, within [-180, 180].
    /// * `latitude`: latitude in **degrees**, within [-90, 90].
    /// * `height`: height above ground in **meters**, finite and non-negative.
    /// * `name`: optional site name.
    ///
    /// Return
    /// ----------
    /// * The observer, or [`HorizonError::InvalidConfiguration`] on invalid input.
    pub fn with_height(
        longitude: Degree,
        latitude: Degree,
        height: Meter,
        name: Option<String>,
    ) -> Result<Observer, HorizonError> {
        let longitude = NotNan::new(longitude)?;
        let latitude = NotNan::new(latitude)?;
        let height = NotNan::new(height)?;

        if !(-180.0..=180.0).contains(&longitude.into_inner()) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "longitude must be between -180 and 180 degrees, got {longitude}"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude.into_inner()) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "latitude must be between -90 and 90 degrees, got {latitude}"
            )));
        }
        if !height.is_finite() || height.into_inner() < 0.0 {
            return Err(HorizonError::InvalidConfiguration(format!(
                "observer height must be finite and non-negative, got {height}"
            )));
        }

        Ok(Observer {
            longitude,
            latitude,
            height,
            name,
        })
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    /// Height above ground in meters.
    #[inline]
    pub fn height(&self) -> Meter {
        self.height.into_inner()
    }

    /// `(longitude, latitude)` in degrees.
    #[inline]
    pub fn coordinates(&self) -> (Degree, Degree) {
        (self.longitude(), self.latitude())
    }
}

/// Coordinates `(longitude, latitude)` in degrees of a few low-frequency radio sites.
pub mod sites {
    use crate::constants::Degree;

    /// Cosmic Twilight Polarimeter, Green Bank
    pub const CTP: (Degree, Degree) = (-79.823038, 38.433727);

    /// EDGES, Murchison Radio-astronomy Observatory
    pub const EDGES: (Degree, Degree) = (116.603480, -26.714923);

    /// REACH, Karoo
    pub const REACH: (Degree, Degree) = (21.375833, -30.833611);

    /// Schrödinger basin, lunar far side
    pub const SCHRODINGER: (Degree, Degree) = (132.4, -75.0);
}

#[cfg(test)]
mod observer_test {
    use super::*;

    #[test]
    fn test_valid_observer() {
        let obs = Observer::new(sites::CTP.0, sites::CTP.1, Some("CTP".into())).unwrap();
        assert_eq!(obs.coordinates(), sites::CTP);
        assert_eq!(obs.height(), 0.0);
        assert_eq!(obs.name.as_deref(), Some("CTP"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Observer::new(180.0, 90.0, None).is_ok());
        assert!(Observer::new(-180.0, -90.0, None).is_ok());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        assert!(matches!(
            Observer::new(180.5, 0.0, None),
            Err(HorizonError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Observer::new(0.0, -90.1, None),
            Err(HorizonError::InvalidConfiguration(_))
        ));
        // co-latitude inputs are rejected
        assert!(Observer::new(0.0, 120.0, None).is_err());
    }

    #[test]
    fn test_invalid_height_and_nan() {
        assert!(Observer::with_height(0.0, 0.0, -1.0, None).is_err());
        assert!(Observer::with_height(0.0, 0.0, f64::INFINITY, None).is_err());
        assert!(Observer::new(f64::NAN, 0.0, None).is_err());
    }
}
