//! # Elevation interpolator
//!
//! Turn an [`ElevationGrid`](crate::raster::ElevationGrid) into a continuous function
//! `h(lon, lat)` using a tensor-product interpolating B-spline (bicubic by default, any degree in
//! `1..=5`).
//!
//! ## Axes
//!
//! The axes are derived from the **actual grid**, never from the bounding box:
//!
//! ```text
//! lon_j = first_lon + j · lon_res        j = 0 .. ncols-1
//! lat_i = south     + i · lat_res        i = 0 .. nrows-1   (rows re-ordered south → north)
//! ```
//!
//! A raster source may round the box outward or return one sample more than `span / res`; the
//! interpolator follows whatever shape it receives.
//!
//! ## Queries
//!
//! Longitudes are folded into the grid's own frame, `first_lon + (lon − first_lon) mod 360`, so a
//! grid built for a box straddling the antimeridian (e.g. `175..185`) answers a query at `-178°`
//! from the right place. Coordinates that still fall outside the grid are clamped to the nearest
//! edge; the bounding-box resolver is responsible for making this a rare event.

pub mod bspline;

use log::{debug, warn};

use crate::bounding_box::BoundingBox;
use crate::constants::{Degree, Meter, MAX_SPLINE_DEGREE};
use crate::horizon_errors::HorizonError;
use crate::interpolation::bspline::TensorSpline;
use crate::raster::ElevationGrid;

/// Continuous elevation model over the area of an [`ElevationGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationField {
    spline: TensorSpline,
    west: Degree,
    east: Degree,
    south: Degree,
    north: Degree,
}

impl ElevationField {
    /// Fit the spline through every sample of `grid`.
    ///
    /// Arguments
    /// -----------------
    /// * `grid`: elevation samples with their georeferencing.
    /// * `bbox`: the area the field is expected to cover; a grid falling short of it is reported
    ///   with a warning, not an error.
    /// * `degree`: spline degree, `1..=5`.
    ///
    /// Return
    /// ----------
    /// * The field, or
    ///   - [`HorizonError::InvalidConfiguration`] for a degree outside `1..=5`,
    ///   - [`HorizonError::GridTooSmall`] when an axis holds fewer than `degree + 1` samples.
    pub fn build(
        grid: &ElevationGrid,
        bbox: &BoundingBox,
        degree: usize,
    ) -> Result<Self, HorizonError> {
        if !(1..=MAX_SPLINE_DEGREE).contains(&degree) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "spline degree must lie in 1..={MAX_SPLINE_DEGREE}, got {degree}"
            )));
        }
        let (nrows, ncols) = (grid.nrows(), grid.ncols());
        if nrows <= degree || ncols <= degree {
            return Err(HorizonError::GridTooSmall {
                rows: nrows,
                cols: ncols,
                degree,
            });
        }

        let res = grid.geometry().resolution;
        let lon_axis = grid.lon_axis();
        let south = grid.south();
        let lat_axis: Vec<Degree> = (0..nrows).map(|i| south + i as f64 * res.lat).collect();

        let west = lon_axis[0];
        let east = lon_axis[ncols - 1];
        let north = lat_axis[nrows - 1];

        let tol = 0.5 * res.lon.max(res.lat);
        let lon_short = east - west + tol < bbox.lon_span().min(360.0 - res.lon);
        if lon_short || south > bbox.south + tol || north < bbox.north - tol {
            warn!(
                "Elevation grid [{west:.4}, {east:.4}] x [{south:.4}, {north:.4}] does not cover \
                 the bounding box [{:.4}, {:.4}] x [{:.4}, {:.4}]; edge samples will be reused",
                bbox.west, bbox.east, bbox.south, bbox.north
            );
        }

        let values: Vec<f64> = (0..ncols)
            .flat_map(|j| (0..nrows).map(move |i| (i, j)))
            .map(|(i, j)| grid.sample_from_south(i, j))
            .collect();

        let spline = TensorSpline::fit(&lon_axis, &lat_axis, values, degree)?;
        debug!("Fitted degree-{degree} elevation spline over {nrows}x{ncols} samples");

        Ok(ElevationField {
            spline,
            west,
            east,
            south,
            north,
        })
    }

    /// Elevation in **meters** at `(lon, lat)` degrees.
    pub fn query(&self, lon: Degree, lat: Degree) -> Meter {
        let (x, y) = self.to_axes(lon, lat);
        self.spline.eval(x, y)
    }

    /// Map a query onto the grid axes: fold the longitude, then clamp both coordinates.
    fn to_axes(&self, lon: Degree, lat: Degree) -> (Degree, Degree) {
        let mut x = self.west + (lon - self.west).rem_euclid(360.0);
        if x > self.east {
            // nearest edge, going either way around the circle
            x = if x - self.east <= self.west + 360.0 - x {
                self.east
            } else {
                self.west
            };
        }
        (x, lat.clamp(self.south, self.north))
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.spline.degree()
    }

    /// Longitude range of the grid, raw frame.
    #[inline]
    pub fn lon_range(&self) -> (Degree, Degree) {
        (self.west, self.east)
    }

    #[inline]
    pub fn lat_range(&self) -> (Degree, Degree) {
        (self.south, self.north)
    }
}
