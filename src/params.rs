//! # Horizon search parameters
//!
//! [`HorizonParams`](crate::params::HorizonParams) gathers every tunable of a horizon computation:
//! the angular search window along each ray, the bounding-box policy, the spline degree of the
//! elevation interpolator and the sampling density of the profile.
//!
//! Parameters are validated **once**, when built; a [`HorizonCalculator`](crate::calculator::HorizonCalculator)
//! never receives an inconsistent set.
//!
//! ## Example
//! ```rust, no_run
//! use skyline::body::Body;
//! use skyline::params::HorizonParams;
//!
//! let params = HorizonParams::builder_for(&Body::moon())
//!     .gamma_min(0.01)
//!     .n_alpha(721)
//!     .record_gamma(true)
//!     .build()?;
//! println!("{params:#}");
//! # Ok::<(), skyline::horizon_errors::HorizonError>(())
//! ```

use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::bounding_box::BoundingBoxPolicy;
use crate::constants::{
    Degree, DEFAULT_GAMMA_MIN, DEFAULT_N_ALPHA, DEFAULT_N_GAMMA, DEFAULT_SPLINE_DEGREE,
    MAX_SPLINE_DEGREE,
};
use crate::horizon_errors::HorizonError;

/// Configuration of a horizon computation.
///
/// Fields
/// -----------------
/// * `gamma_min` – Smallest angular distance sampled along a ray (degrees, > 0).
/// * `gamma_max` – Largest angular distance sampled along a ray (degrees, in (gamma_min, 180)).
/// * `spline_degree` – Degree of the elevation interpolator (1..=5).
/// * `bbox_policy` – How the elevation bounding box is derived.
/// * `n_alpha` – Number of azimuths of the profile, 0° and 360° included (≥ 2).
/// * `n_gamma` – Number of angular distances sampled per azimuth (≥ 1).
/// * `record_gamma` – Keep the angular distance of the maximum for each azimuth.
/// * `resolution_hint` – Coarsest elevation sample spacing worth loading (degrees, > 0), or `None`
///   for the native resolution of the raster source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonParams {
    pub gamma_min: Degree,
    pub gamma_max: Degree,
    pub spline_degree: usize,
    pub bbox_policy: BoundingBoxPolicy,
    pub n_alpha: usize,
    pub n_gamma: usize,
    pub record_gamma: bool,
    #[serde(default)]
    pub resolution_hint: Option<Degree>,
}

impl HorizonParams {
    /// Builder seeded with the Earth defaults.
    pub fn builder() -> HorizonParamsBuilder {
        HorizonParamsBuilder::new()
    }

    /// Builder seeded with the search defaults of `body`.
    pub fn builder_for(body: &Body) -> HorizonParamsBuilder {
        HorizonParamsBuilder {
            params: HorizonParams::for_body(body),
        }
    }

    /// Default parameters for `body` (its `gamma_max`, everything else shared).
    pub fn for_body(body: &Body) -> Self {
        HorizonParams {
            gamma_max: body.default_gamma_max,
            ..HorizonParams::default()
        }
    }

    /// Check every rule on the current values.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`HorizonError::InvalidConfiguration`] naming the first broken rule.
    pub fn validate(&self) -> Result<(), HorizonError> {
        if !gt0(self.gamma_min) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "gamma_min must be > 0, got {}",
                self.gamma_min
            )));
        }
        if !lt(self.gamma_min, self.gamma_max) || !lt(self.gamma_max, 180.0) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "require gamma_min < gamma_max < 180, got gamma_min={} gamma_max={}",
                self.gamma_min, self.gamma_max
            )));
        }
        if !(1..=MAX_SPLINE_DEGREE).contains(&self.spline_degree) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "spline_degree must lie in 1..={MAX_SPLINE_DEGREE}, got {}",
                self.spline_degree
            )));
        }
        if self.n_alpha < 2 {
            return Err(HorizonError::InvalidConfiguration(
                "n_alpha must be >= 2 (0 and 360 degrees)".into(),
            ));
        }
        if self.n_gamma < 1 {
            return Err(HorizonError::InvalidConfiguration(
                "n_gamma must be >= 1".into(),
            ));
        }

        if let Some(step) = self.resolution_hint {
            if !gt0(step) || step.is_infinite() {
                return Err(HorizonError::InvalidConfiguration(format!(
                    "resolution_hint must be a positive number of degrees, got {step}"
                )));
            }
        }

        match self.bbox_policy {
            BoundingBoxPolicy::Swept { azimuth_step } => {
                if !gt0(azimuth_step) || azimuth_step > 90.0 {
                    return Err(HorizonError::InvalidConfiguration(format!(
                        "azimuth_step must lie in (0, 90] degrees, got {azimuth_step}"
                    )));
                }
            }
            BoundingBoxPolicy::FixedWidth {
                lon_width,
                lat_width,
            } => {
                let min_width = 2.0 * self.gamma_max;
                if !ge(lon_width, min_width) || !ge(lat_width, min_width) {
                    return Err(HorizonError::InvalidConfiguration(format!(
                        "fixed grid width {lon_width} x {lat_width} must be at least 2 * gamma_max = {min_width}"
                    )));
                }
                if lon_width > 360.0 || lat_width > 180.0 {
                    return Err(HorizonError::InvalidConfiguration(format!(
                        "fixed grid width {lon_width} x {lat_width} exceeds 360 x 180"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Angular distances sampled along every ray, degrees, ascending.
    pub fn gammas(&self) -> Vec<Degree> {
        linspace(self.gamma_min, self.gamma_max, self.n_gamma)
    }
}

impl Default for HorizonParams {
    fn default() -> Self {
        let earth = Body::earth();
        HorizonParams {
            gamma_min: DEFAULT_GAMMA_MIN,
            gamma_max: earth.default_gamma_max,
            spline_degree: DEFAULT_SPLINE_DEGREE,
            bbox_policy: BoundingBoxPolicy::default(),
            n_alpha: DEFAULT_N_ALPHA,
            n_gamma: DEFAULT_N_GAMMA,
            record_gamma: false,
            resolution_hint: None,
        }
    }
}

/// `n` evenly spaced values from `start` to `end`, both included; `[start]` when `n == 1`.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Return true iff x > 0.0 and comparable (i.e., not NaN).
#[inline]
fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

/// Return true iff a < b and comparable.
#[inline]
fn lt(a: f64, b: f64) -> bool {
    a.partial_cmp(&b) == Some(Less)
}

/// Return true iff a >= b and comparable.
#[inline]
fn ge(a: f64, b: f64) -> bool {
    matches!(a.partial_cmp(&b), Some(Greater) | Some(Equal))
}

/// Fluent builder for [`HorizonParams`].
#[derive(Debug, Clone)]
pub struct HorizonParamsBuilder {
    params: HorizonParams,
}

impl Default for HorizonParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HorizonParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: HorizonParams::default(),
        }
    }

    pub fn gamma_min(mut self, v: Degree) -> Self {
        self.params.gamma_min = v;
        self
    }
    pub fn gamma_max(mut self, v: Degree) -> Self {
        self.params.gamma_max = v;
        self
    }
    pub fn spline_degree(mut self, v: usize) -> Self {
        self.params.spline_degree = v;
        self
    }
    pub fn bbox_policy(mut self, v: BoundingBoxPolicy) -> Self {
        self.params.bbox_policy = v;
        self
    }

    /// Square fixed-width box of `width` degrees on each axis.
    pub fn fixed_width(mut self, width: Degree) -> Self {
        self.params.bbox_policy = BoundingBoxPolicy::FixedWidth {
            lon_width: width,
            lat_width: width,
        };
        self
    }

    /// Swept box with the ring sampled every `azimuth_step` degrees.
    pub fn swept(mut self, azimuth_step: Degree) -> Self {
        self.params.bbox_policy = BoundingBoxPolicy::Swept { azimuth_step };
        self
    }

    pub fn n_alpha(mut self, v: usize) -> Self {
        self.params.n_alpha = v;
        self
    }
    pub fn n_gamma(mut self, v: usize) -> Self {
        self.params.n_gamma = v;
        self
    }
    pub fn record_gamma(mut self, v: bool) -> Self {
        self.params.record_gamma = v;
        self
    }

    /// Ask the raster source for samples no finer than `step` degrees.
    pub fn resolution_hint(mut self, step: Degree) -> Self {
        self.params.resolution_hint = Some(step);
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ----------
    /// * The parameters, or [`HorizonError::InvalidConfiguration`] (see [`HorizonParams::validate`]).
    pub fn build(self) -> Result<HorizonParams, HorizonError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Width of the name column of the parameter table.
const NAME_WIDTH: usize = 16;
/// Width of the right-aligned value column of the parameter table.
const VALUE_WIDTH: usize = 22;

/// One `name  value unit  description` row of the parameter table.
fn table_row(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    value: impl fmt::Display,
    unit: &str,
    description: &str,
) -> fmt::Result {
    let value = value.to_string();
    writeln!(
        f,
        "  {name:<NAME_WIDTH$}{value:>VALUE_WIDTH$} {unit:<4}| {description}"
    )
}

impl fmt::Display for HorizonParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = match self.bbox_policy {
            BoundingBoxPolicy::Swept { azimuth_step } => format!("swept/{azimuth_step}"),
            BoundingBoxPolicy::FixedWidth {
                lon_width,
                lat_width,
            } => format!("fixed {lon_width}x{lat_width}"),
        };
        let hint = self
            .resolution_hint
            .map_or_else(|| "native".to_string(), |step| format!("{step:.6}"));

        if !f.alternate() {
            return write!(
                f,
                "HorizonParams(gamma∈[{}, {}]°, n_alpha={}, n_gamma={}, degree={}, bbox={}, record_gamma={}, resolution={})",
                self.gamma_min,
                self.gamma_max,
                self.n_alpha,
                self.n_gamma,
                self.spline_degree,
                policy,
                self.record_gamma,
                hint
            );
        }

        let rule = "=".repeat(2 + NAME_WIDTH + VALUE_WIDTH + 6);
        writeln!(f, "Horizon search")?;
        writeln!(f, "{rule}")?;

        writeln!(f, "Along each ray")?;
        table_row(f, "gamma_min", format!("{:.4}", self.gamma_min), "deg", "nearest terrain sample")?;
        table_row(f, "gamma_max", format!("{:.4}", self.gamma_max), "deg", "farthest terrain sample")?;
        table_row(f, "n_gamma", self.n_gamma, "", "samples per ray")?;
        table_row(f, "record_gamma", self.record_gamma, "", "keep the distance of the skyline")?;

        writeln!(f, "Around the observer")?;
        table_row(f, "n_alpha", self.n_alpha, "", "azimuths from 0 to 360 deg")?;

        writeln!(f, "Terrain model")?;
        table_row(f, "bbox_policy", policy, "deg", "elevation box")?;
        table_row(f, "resolution_hint", hint, "deg", "coarsest useful sample spacing")?;
        table_row(f, "spline_degree", self.spline_degree, "", "B-spline interpolation")?;

        write!(f, "{rule}")
    }
}
