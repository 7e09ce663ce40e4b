//! Static parameters of the spherical body the observer stands on.

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter, EARTH_MEAN_RADIUS, MOON_MEAN_RADIUS};
use crate::horizon_errors::HorizonError;

/// A body modelled as a sphere of fixed radius.
///
/// Besides the radius, a body carries the search defaults that suit its size: how far along each
/// ray to look for terrain (`default_gamma_max`) and how wide a fixed-width elevation box should be
/// (`default_grid_width`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    /// Volumetric mean radius in **meters**.
    pub radius: Meter,
    /// Default maximum angular distance of the ray search, in **degrees**.
    pub default_gamma_max: Degree,
    /// Default full width of a fixed-width elevation box, in **degrees**.
    pub default_grid_width: Degree,
}

impl Body {
    pub fn earth() -> Self {
        Body {
            name: "Earth".into(),
            radius: EARTH_MEAN_RADIUS,
            default_gamma_max: 0.5,
            default_grid_width: 2.0,
        }
    }

    pub fn moon() -> Self {
        Body {
            name: "Moon".into(),
            radius: MOON_MEAN_RADIUS,
            default_gamma_max: 8.0,
            default_grid_width: 20.0,
        }
    }

    /// A custom body.
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] if the body breaks a rule of [`Body::validate`].
    pub fn new(
        name: impl Into<String>,
        radius: Meter,
        default_gamma_max: Degree,
        default_grid_width: Degree,
    ) -> Result<Self, HorizonError> {
        let body = Body {
            name: name.into(),
            radius,
            default_gamma_max,
            default_grid_width,
        };
        body.validate()?;
        Ok(body)
    }

    /// Check the radius and the search defaults.
    ///
    /// The fields are public, so a body built as a struct literal is only checked here.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`HorizonError::InvalidConfiguration`] if the radius is not a positive finite
    ///   number of meters, `default_gamma_max` is outside (0, 180) or `default_grid_width` is not
    ///   strictly positive.
    pub fn validate(&self) -> Result<(), HorizonError> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "radius of {} must be a positive finite number of meters, got {}",
                self.name, self.radius
            )));
        }
        if !(self.default_gamma_max > 0.0 && self.default_gamma_max < 180.0) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "default gamma_max of {} must lie in (0, 180) degrees, got {}",
                self.name, self.default_gamma_max
            )));
        }
        if !(self.default_grid_width > 0.0 && self.default_grid_width.is_finite()) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "default grid width of {} must be > 0, got {}",
                self.name, self.default_grid_width
            )));
        }
        Ok(())
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::earth()
    }
}
