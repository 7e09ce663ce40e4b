//! # Horizon calculator
//!
//! Two-phase entry point of the crate.
//!
//! 1. [`HorizonCalculator`](crate::calculator::HorizonCalculator) – the validated inputs: an
//!    [`Observer`], a [`Body`], [`HorizonParams`] and any [`RasterSource`]. Nothing expensive
//!    happens at construction.
//! 2. [`HorizonModel`](crate::calculator::HorizonModel) – produced by
//!    [`HorizonCalculator::prepare`](crate::calculator::HorizonCalculator::prepare), which resolves
//!    the bounding box, loads the elevation grid once, fits the elevation field and derives the
//!    observer elevation. The model is immutable and `Sync`; every profile is computed from it.
//!
//! Because the derived state only exists inside a [`HorizonModel`], it cannot be read before it has
//! been computed, and it cannot go stale: changing an input means building a new calculator.
//!
//! ```rust, no_run
//! use skyline::body::Body;
//! use skyline::calculator::HorizonCalculator;
//! use skyline::observer::{sites, Observer};
//! use skyline::params::HorizonParams;
//! use skyline::raster::srtm::SrtmSource;
//!
//! let (lon, lat) = sites::CTP;
//! let calculator = HorizonCalculator::new(
//!     Observer::new(lon, lat, Some("CTP".into()))?,
//!     Body::earth(),
//!     HorizonParams::default(),
//!     SrtmSource::from_cache_dir()?,
//! )?;
//! let model = calculator.prepare()?;
//! let profile = model.default_profile()?;
//! println!("highest skyline point: {:?}", profile.max());
//! # Ok::<(), skyline::horizon_errors::HorizonError>(())
//! ```

use std::time::Instant;

use log::{debug, info};

use crate::body::Body;
use crate::bounding_box::{resolve_bounding_box, BoundingBox};
use crate::constants::{Degree, Meter, Radian};
use crate::horizon_angle::horizon_angle;
use crate::horizon_errors::HorizonError;
use crate::interpolation::ElevationField;
use crate::observer::Observer;
use crate::params::HorizonParams;
use crate::projection::project;
use crate::raster::{RasterSource, Resolution};

/// Validated inputs of a horizon computation.
#[derive(Debug, Clone)]
pub struct HorizonCalculator<S> {
    observer: Observer,
    body: Body,
    params: HorizonParams,
    source: S,
}

impl<S: RasterSource> HorizonCalculator<S> {
    /// Gather the inputs.
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] if `body` or `params` breaks a rule (see
    ///   [`Body::validate`] and [`HorizonParams::validate`]).
    pub fn new(
        observer: Observer,
        body: Body,
        params: HorizonParams,
        source: S,
    ) -> Result<Self, HorizonError> {
        body.validate()?;
        params.validate()?;
        Ok(HorizonCalculator {
            observer,
            body,
            params,
            source,
        })
    }

    #[inline]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn params(&self) -> &HorizonParams {
        &self.params
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Bounding box of the elevation data needed by the search.
    pub fn bounding_box(&self) -> Result<BoundingBox, HorizonError> {
        resolve_bounding_box(
            &self.observer,
            self.params.gamma_max,
            &self.params.bbox_policy,
        )
    }

    /// Load the elevation data and build the immutable model.
    ///
    /// This is the only place the raster source is read. The grid is dropped once the field has
    /// been fitted.
    ///
    /// Return
    /// ----------
    /// * The model, or the first error of bounding-box resolution, raster loading
    ///   ([`HorizonError::DataUnavailable`]) or field construction.
    pub fn prepare(&self) -> Result<HorizonModel, HorizonError> {
        let t_start = Instant::now();
        let bbox = self.bounding_box()?;

        let hint = self.params.resolution_hint.map(Resolution::uniform);
        let grid = self.source.load(&bbox, hint)?;
        let resolution = grid.geometry().resolution;
        debug!(
            "Elevation grid: {}x{} samples at {:.3e} x {:.3e} deg",
            grid.nrows(),
            grid.ncols(),
            resolution.lon,
            resolution.lat
        );
        let field = ElevationField::build(&grid, &bbox, self.params.spline_degree)?;
        drop(grid);

        let (lon, lat) = self.observer.coordinates();
        let ground = field.query(lon, lat);
        let observer_elevation = ground + self.observer.height();

        info!(
            "Prepared horizon model for {} on {} (observer elevation {:.2} m) in {:.2} s",
            self.observer.name.as_deref().unwrap_or("unnamed site"),
            self.body.name,
            observer_elevation,
            t_start.elapsed().as_secs_f64()
        );

        Ok(HorizonModel {
            observer: self.observer.clone(),
            body: self.body.clone(),
            params: self.params.clone(),
            bbox,
            resolution,
            field,
            observer_elevation,
        })
    }
}

/// Computed, read-only state of a horizon computation.
#[derive(Debug, Clone)]
pub struct HorizonModel {
    observer: Observer,
    body: Body,
    params: HorizonParams,
    bbox: BoundingBox,
    resolution: Resolution,
    field: ElevationField,
    observer_elevation: Meter,
}

impl HorizonModel {
    #[inline]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn params(&self) -> &HorizonParams {
        &self.params
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Sample spacing of the elevation grid the field was fitted on.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn field(&self) -> &ElevationField {
        &self.field
    }

    /// Ground elevation at the observer plus its height above ground, meters.
    #[inline]
    pub fn observer_elevation(&self) -> Meter {
        self.observer_elevation
    }

    /// Terrain elevation at `(lon, lat)` degrees.
    #[inline]
    pub fn elevation(&self, lon: Degree, lat: Degree) -> Meter {
        self.field.query(lon, lat)
    }

    /// Horizon angle of the terrain at azimuth `alpha`, angular distance `gamma`, all in radians.
    ///
    /// `gamma` must be strictly positive.
    pub fn horizon_angle(&self, alpha: Radian, gamma: Radian) -> Radian {
        let (lon, lat) = project(&self.observer, alpha, gamma);
        let h = self.field.query(lon, lat);
        horizon_angle(self.observer_elevation, h, gamma, self.body.radius)
    }
}
