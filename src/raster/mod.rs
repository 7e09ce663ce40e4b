//! # Elevation raster sources
//!
//! The horizon engine does not read DEM files itself. It asks a [`RasterSource`](crate::raster::RasterSource)
//! for "a 2D grid of elevation samples covering this bounding box", and receives an
//! [`ElevationGrid`](crate::raster::ElevationGrid) that carries its own georeferencing.
//!
//! ## Grid conventions
//!
//! ```text
//!            first_lon      first_lon + (cols-1)·lon_res
//!  first_lat   ┌─────────────────────────┐   row 0      (RowOrder::NorthToSouth)
//!              │                         │
//!              └─────────────────────────┘   row rows-1
//! ```
//!
//! * Columns always run **west → east**, starting at `first_lon`.
//! * Rows run in the direction given by [`RowOrder`](crate::raster::RowOrder); `first_lat` is the
//!   latitude of row 0. Rasters are usually stored north-to-south.
//! * Coordinates are those of the **samples**, not of pixel edges.
//!
//! ## Implementations
//!
//! * [`SrtmSource`](crate::raster::srtm::SrtmSource) – terrestrial SRTM 1 arc-second tiles.
//! * [`LunarSource`](crate::raster::lunar::LunarSource) – global lunar products with automatic
//!   product selection.
//! * [`GlobalRaster`](crate::raster::lunar::GlobalRaster) – an in-memory global raster.
//! * [`FunctionSource`](crate::raster::FunctionSource) – analytic terrain `h(lon, lat)`, sampled on demand.

pub mod lunar;
pub mod srtm;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::constants::{Degree, Meter};
use crate::horizon_errors::HorizonError;

/// Direction in which grid rows advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOrder {
    NorthToSouth,
    SouthToNorth,
}

/// Angular size of one grid step on each axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub lon: Degree,
    pub lat: Degree,
}

impl Resolution {
    pub fn uniform(step: Degree) -> Self {
        Resolution {
            lon: step,
            lat: step,
        }
    }

    /// Resolution of a product sampled at `ppd` pixels per degree.
    pub fn from_pixels_per_degree(ppd: u32) -> Self {
        Resolution::uniform(1.0 / ppd as f64)
    }
}

/// Georeferencing of an [`ElevationGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Longitude of column 0, degrees. May lie outside [-180, 180] for wrapped boxes.
    pub first_lon: Degree,
    /// Latitude of row 0, degrees.
    pub first_lat: Degree,
    pub resolution: Resolution,
    pub row_order: RowOrder,
}

/// Rectangular grid of elevation samples in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    samples: DMatrix<f64>,
    geometry: GridGeometry,
}

impl ElevationGrid {
    /// Wrap a sample matrix (`rows × cols`) with its georeferencing.
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] if the grid is empty, a resolution is not strictly
    ///   positive, or a sample is not finite.
    pub fn new(samples: DMatrix<f64>, geometry: GridGeometry) -> Result<Self, HorizonError> {
        if samples.nrows() == 0 || samples.ncols() == 0 {
            return Err(HorizonError::InvalidConfiguration(
                "elevation grid must not be empty".into(),
            ));
        }
        let res = geometry.resolution;
        if !(res.lon > 0.0 && res.lat > 0.0) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "grid resolution must be > 0, got {} x {}",
                res.lon, res.lat
            )));
        }
        if samples.iter().any(|h| !h.is_finite()) {
            return Err(HorizonError::InvalidConfiguration(
                "elevation grid contains non-finite samples".into(),
            ));
        }
        Ok(ElevationGrid { samples, geometry })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.samples.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.samples.ncols()
    }

    #[inline]
    pub fn samples(&self) -> &DMatrix<f64> {
        &self.samples
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Longitude of every column, west to east.
    pub fn lon_axis(&self) -> Vec<Degree> {
        let g = &self.geometry;
        (0..self.ncols())
            .map(|j| g.first_lon + j as f64 * g.resolution.lon)
            .collect()
    }

    /// Latitude of every row, in row order.
    pub fn lat_axis(&self) -> Vec<Degree> {
        let g = &self.geometry;
        let sign = match g.row_order {
            RowOrder::NorthToSouth => -1.0,
            RowOrder::SouthToNorth => 1.0,
        };
        (0..self.nrows())
            .map(|i| g.first_lat + sign * i as f64 * g.resolution.lat)
            .collect()
    }

    /// Elevation of the sample in the `k`-th row counted from the **south** edge, column `j`.
    #[inline]
    pub(crate) fn sample_from_south(&self, k: usize, j: usize) -> Meter {
        match self.geometry.row_order {
            RowOrder::NorthToSouth => self.samples[(self.nrows() - 1 - k, j)],
            RowOrder::SouthToNorth => self.samples[(k, j)],
        }
    }

    /// Latitude of the southernmost row.
    pub fn south(&self) -> Degree {
        let g = &self.geometry;
        match g.row_order {
            RowOrder::NorthToSouth => {
                g.first_lat - (self.nrows() - 1) as f64 * g.resolution.lat
            }
            RowOrder::SouthToNorth => g.first_lat,
        }
    }

    /// Latitude of the northernmost row.
    pub fn north(&self) -> Degree {
        self.south() + (self.nrows() - 1) as f64 * self.geometry.resolution.lat
    }

    /// Longitude of the easternmost column.
    pub fn east(&self) -> Degree {
        self.geometry.first_lon + (self.ncols() - 1) as f64 * self.geometry.resolution.lon
    }
}

/// Provider of elevation samples for a bounding box.
///
/// `resolution_hint` is the coarsest sample spacing the caller can work with. A source that can
/// choose between resolutions may use it to avoid reading more data than needed; a source with a
/// single native resolution ignores it. The resolution actually used is reported by the returned
/// grid's [`GridGeometry`].
pub trait RasterSource {
    /// Load the elevation samples covering `bbox`.
    ///
    /// Errors
    /// ----------
    /// * [`HorizonError::DataUnavailable`] if the source has no coverage for (part of) the box.
    fn load(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError>;
}

impl<S: RasterSource + ?Sized> RasterSource for &S {
    fn load(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        (**self).load(bbox, resolution_hint)
    }
}

impl<S: RasterSource + ?Sized> RasterSource for Box<S> {
    fn load(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        (**self).load(bbox, resolution_hint)
    }
}

/// Analytic terrain `h(lon, lat)` sampled on a regular grid when loaded.
///
/// Handy for synthetic scenes (flat spheres, planes, isolated ridges). Longitudes handed to the
/// closure are the raw box longitudes and may lie outside [-180, 180]. A resolution hint, when
/// given, replaces the configured sampling step.
pub struct FunctionSource<F> {
    resolution: Resolution,
    elevation: F,
}

impl<F> FunctionSource<F>
where
    F: Fn(Degree, Degree) -> Meter,
{
    pub fn new(resolution: Resolution, elevation: F) -> Self {
        FunctionSource {
            resolution,
            elevation,
        }
    }
}

impl<F> RasterSource for FunctionSource<F>
where
    F: Fn(Degree, Degree) -> Meter,
{
    fn load(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        let mut res = resolution_hint.unwrap_or(self.resolution);
        let ncols = (bbox.lon_span() / res.lon).ceil() as usize + 1;
        let nrows = (bbox.lat_span() / res.lat).ceil() as usize + 1;

        // rows start at the northern edge; the last one must not pass the south pole
        if nrows > 1 && bbox.north - (nrows - 1) as f64 * res.lat < -90.0 {
            res.lat = (bbox.north + 90.0) / (nrows - 1) as f64;
        }

        let samples = DMatrix::from_fn(nrows, ncols, |i, j| {
            let lat = bbox.north - i as f64 * res.lat;
            (self.elevation)(bbox.west + j as f64 * res.lon, lat)
        });

        ElevationGrid::new(
            samples,
            GridGeometry {
                first_lon: bbox.west,
                first_lat: bbox.north,
                resolution: res,
                row_order: RowOrder::NorthToSouth,
            },
        )
    }
}
