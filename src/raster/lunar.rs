//! # Lunar elevation from global products
//!
//! The Moon is covered by two pre-downloaded, simple-cylindrical global products:
//!
//! | product | sampling | latitude coverage |
//! |---|---|---|
//! | LOLA + Kaguya merge (SLDEM) | 512 px/deg | 60°S – 60°N |
//! | LOLA global (LDEM) | 256 px/deg | 90°S – 90°N |
//!
//! [`LunarSource`](crate::raster::lunar::LunarSource) picks the high-resolution product whenever the
//! bounding box lies strictly inside its latitude band and its file is present, and falls back to
//! the global product otherwise. A resolution hint at least as coarse as the global product also
//! selects the global product.
//!
//! ## Pixel arithmetic
//!
//! Products are raw row-major rasters (`i16` or `f32`, little endian) with row 0 on the northern
//! edge and column 0 on the western edge of the map (-180° by default). Samples sit at pixel
//! centres. A bounding box maps onto a [`PixelWindow`]: a band of rows and one or two column
//! segments. When the box straddles the map seam, the window is split into a segment running to
//! the last column and a segment starting at column 0; the two are concatenated west to east.
//!
//! Files are read window by window (one seek per row and segment), so the full global raster is
//! never held in memory. [`GlobalRaster`](crate::raster::lunar::GlobalRaster) offers the same
//! slicing for a raster that already lives in memory.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use log::{debug, info};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::constants::{Degree, EPS};
use crate::horizon_errors::HorizonError;
use crate::raster::{ElevationGrid, GridGeometry, RasterSource, Resolution, RowOrder};

/// File name of the LOLA global product inside a product directory.
pub const LDEM_FILE: &str = "Lunar_LRO_LOLA_Global_LDEM_118m_Mar2014.img";

/// File name of the LOLA + Kaguya merged product inside a product directory.
pub const SLDEM_FILE: &str = "Lunar_LRO_LOLAKaguya_DEMmerge_60N60S_512ppd.img";

/// Encoding of the samples of a raw product; elevation = `raw · scale + offset` meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleFormat {
    I16Le { scale: f64, offset: f64 },
    F32Le { scale: f64, offset: f64 },
}

impl SampleFormat {
    #[inline]
    fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::I16Le { .. } => 2,
            SampleFormat::F32Le { .. } => 4,
        }
    }

    #[inline]
    fn decode(&self, b: &[u8]) -> f64 {
        match *self {
            SampleFormat::I16Le { scale, offset } => {
                i16::from_le_bytes([b[0], b[1]]) as f64 * scale + offset
            }
            SampleFormat::F32Le { scale, offset } => {
                f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64 * scale + offset
            }
        }
    }
}

/// A global simple-cylindrical elevation product stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarProduct {
    pub name: String,
    pub path: Utf8PathBuf,
    pub pixels_per_degree: u32,
    /// Latitude of the northern edge; the product covers `[-max_lat, max_lat]`.
    pub max_lat: Degree,
    /// Longitude of the western edge of column 0.
    pub west_edge: Degree,
    pub format: SampleFormat,
}

impl LunarProduct {
    /// LOLA global DEM, 256 px/deg, 0.5 m integer steps.
    pub fn ldem(path: impl Into<Utf8PathBuf>) -> Self {
        LunarProduct {
            name: "LOLA global DEM".into(),
            path: path.into(),
            pixels_per_degree: 256,
            max_lat: 90.0,
            west_edge: -180.0,
            format: SampleFormat::I16Le {
                scale: 0.5,
                offset: 0.0,
            },
        }
    }

    /// LOLA + Kaguya merged DEM, 512 px/deg, 60°S – 60°N, float kilometers.
    pub fn sldem(path: impl Into<Utf8PathBuf>) -> Self {
        LunarProduct {
            name: "LOLA+Kaguya merged DEM".into(),
            path: path.into(),
            pixels_per_degree: 512,
            max_lat: 60.0,
            west_edge: -180.0,
            format: SampleFormat::F32Le {
                scale: 1000.0,
                offset: 0.0,
            },
        }
    }

    #[inline]
    pub fn resolution(&self) -> Degree {
        1.0 / self.pixels_per_degree as f64
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        360 * self.pixels_per_degree as usize
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        (2.0 * self.max_lat * self.pixels_per_degree as f64).round() as usize
    }

    /// Whether the latitude band of `bbox` lies strictly inside the product coverage.
    pub fn covers(&self, bbox: &BoundingBox) -> bool {
        bbox.south > -self.max_lat && bbox.north < self.max_lat
    }

    /// Read the samples of `window` from disk.
    fn read_window(&self, window: &PixelWindow) -> Result<DMatrix<f64>, HorizonError> {
        let bps = self.format.bytes_per_sample();
        let ncols = self.ncols();

        let mut file = File::open(&self.path).map_err(|e| {
            HorizonError::DataUnavailable(format!("cannot open {} ({}): {e}", self.name, self.path))
        })?;
        let expected = (self.nrows() * ncols * bps) as u64;
        let actual = file.metadata()?.len();
        if actual != expected {
            return Err(HorizonError::DataUnavailable(format!(
                "{} has {actual} bytes, expected {expected}",
                self.path
            )));
        }

        let mut samples = DMatrix::<f64>::zeros(window.nrows, window.ncols());
        let mut buffer = Vec::new();
        for i in 0..window.nrows {
            let row = window.row_start + i;
            let mut j0 = 0;
            for &(start, len) in &window.segments {
                buffer.resize(len * bps, 0u8);
                file.seek(SeekFrom::Start(((row * ncols + start) * bps) as u64))?;
                file.read_exact(&mut buffer)?;
                for (k, chunk) in buffer.chunks_exact(bps).enumerate() {
                    samples[(i, j0 + k)] = self.format.decode(chunk);
                }
                j0 += len;
            }
        }
        Ok(samples)
    }
}

/// Rows and column segments of a global raster covering a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PixelWindow {
    pub row_start: usize,
    pub nrows: usize,
    /// `(first column, number of columns)`, west to east.
    pub segments: Vec<(usize, usize)>,
    pub first_lon: Degree,
    pub first_lat: Degree,
}

impl PixelWindow {
    pub fn ncols(&self) -> usize {
        self.segments.iter().map(|&(_, len)| len).sum()
    }
}

/// Pixel window of a pixel-centred global raster covering `bbox`.
///
/// Arguments
/// -----------------
/// * `ppd`: pixels per degree on both axes.
/// * `north_edge`: latitude of the northern edge of row 0.
/// * `west_edge`: longitude of the western edge of column 0.
/// * `total_rows`: rows held by the raster.
/// * `bbox`: the area to cover.
///
/// Return
/// ----------
/// * The window, or [`HorizonError::DataUnavailable`] if the latitude band of `bbox` leaves the raster.
pub(crate) fn pixel_window(
    ppd: u32,
    north_edge: Degree,
    west_edge: Degree,
    total_rows: usize,
    bbox: &BoundingBox,
) -> Result<PixelWindow, HorizonError> {
    let res = 1.0 / ppd as f64;
    let total_cols = 360 * ppd as usize;
    let south_edge = north_edge - total_rows as f64 * res;

    if bbox.north > north_edge + EPS || bbox.south < south_edge - EPS {
        return Err(HorizonError::DataUnavailable(format!(
            "latitudes [{}, {}] fall outside the raster coverage [{south_edge}, {north_edge}]",
            bbox.south, bbox.north
        )));
    }

    let r0 = ((north_edge - bbox.north) / res - 0.5).floor().max(0.0) as usize;
    let r1 = (((north_edge - bbox.south) / res - 0.5).ceil() as usize).min(total_rows - 1);

    let c0 = ((bbox.west - west_edge) / res - 0.5).floor() as i64;
    let c1 = ((bbox.east - west_edge) / res - 0.5).ceil() as i64;
    let len = ((c1 - c0 + 1) as usize).min(total_cols + 1);
    let start = c0.rem_euclid(total_cols as i64) as usize;

    // split at the map seam
    let segments = if start + len <= total_cols {
        vec![(start, len)]
    } else {
        let head = total_cols - start;
        vec![(start, head), (0, len - head)]
    };

    Ok(PixelWindow {
        row_start: r0,
        nrows: r1 - r0 + 1,
        segments,
        first_lon: west_edge + (c0 as f64 + 0.5) * res,
        first_lat: north_edge - (r0 as f64 + 0.5) * res,
    })
}

fn window_grid(
    samples: DMatrix<f64>,
    window: &PixelWindow,
    ppd: u32,
) -> Result<ElevationGrid, HorizonError> {
    ElevationGrid::new(
        samples,
        GridGeometry {
            first_lon: window.first_lon,
            first_lat: window.first_lat,
            resolution: Resolution::from_pixels_per_degree(ppd),
            row_order: RowOrder::NorthToSouth,
        },
    )
}

/// A global (360° wide) pixel-centred raster held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalRaster {
    samples: DMatrix<f64>,
    pixels_per_degree: u32,
    north_edge: Degree,
    west_edge: Degree,
}

impl GlobalRaster {
    /// Wrap `samples` (row 0 north, column 0 at `west_edge`).
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] unless the raster is exactly `360 · ppd` columns wide
    ///   and its rows stay within [-90°, 90°].
    pub fn new(
        samples: DMatrix<f64>,
        pixels_per_degree: u32,
        north_edge: Degree,
        west_edge: Degree,
    ) -> Result<Self, HorizonError> {
        if pixels_per_degree == 0 || samples.ncols() != 360 * pixels_per_degree as usize {
            return Err(HorizonError::InvalidConfiguration(format!(
                "a global raster at {pixels_per_degree} px/deg needs {} columns, got {}",
                360 * pixels_per_degree as usize,
                samples.ncols()
            )));
        }
        let south_edge = north_edge - samples.nrows() as f64 / pixels_per_degree as f64;
        if samples.nrows() == 0 || north_edge > 90.0 + EPS || south_edge < -90.0 - EPS {
            return Err(HorizonError::InvalidConfiguration(format!(
                "global raster rows must lie within [-90, 90], got [{south_edge}, {north_edge}]"
            )));
        }
        Ok(GlobalRaster {
            samples,
            pixels_per_degree,
            north_edge,
            west_edge,
        })
    }

    #[inline]
    pub fn pixels_per_degree(&self) -> u32 {
        self.pixels_per_degree
    }

    /// Extract the grid covering `bbox`, concatenating the two sides of the seam when needed.
    pub fn slice(&self, bbox: &BoundingBox) -> Result<ElevationGrid, HorizonError> {
        let window = pixel_window(
            self.pixels_per_degree,
            self.north_edge,
            self.west_edge,
            self.samples.nrows(),
            bbox,
        )?;

        let mut out = DMatrix::<f64>::zeros(window.nrows, window.ncols());
        let mut j0 = 0;
        for &(start, len) in &window.segments {
            out.view_mut((0, j0), (window.nrows, len)).copy_from(
                &self
                    .samples
                    .view((window.row_start, start), (window.nrows, len)),
            );
            j0 += len;
        }
        window_grid(out, &window, self.pixels_per_degree)
    }
}

impl RasterSource for GlobalRaster {
    fn load(
        &self,
        bbox: &BoundingBox,
        _resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        self.slice(bbox)
    }
}

/// Planetary raster source backed by a global product and an optional higher-resolution one.
#[derive(Debug, Clone)]
pub struct LunarSource {
    global: LunarProduct,
    high_res: Option<LunarProduct>,
}

impl LunarSource {
    pub fn new(global: LunarProduct, high_res: Option<LunarProduct>) -> Self {
        LunarSource { global, high_res }
    }

    /// Both products under `dir`, with their usual file names.
    pub fn from_dir(dir: &Utf8Path) -> Self {
        LunarSource::new(
            LunarProduct::ldem(dir.join(LDEM_FILE)),
            Some(LunarProduct::sldem(dir.join(SLDEM_FILE))),
        )
    }

    /// Both products under the user cache directory, `<cache>/skyline_cache/lola`.
    pub fn from_cache_dir() -> Result<Self, HorizonError> {
        let base_dir = BaseDirs::new().ok_or_else(|| {
            HorizonError::DataUnavailable("cannot find the user cache directory".into())
        })?;
        let cache_path = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
            HorizonError::DataUnavailable("user cache directory is not valid UTF-8".into())
        })?;
        Ok(LunarSource::from_dir(
            &cache_path.join("skyline_cache").join("lola"),
        ))
    }

    /// Product used for `bbox`.
    ///
    /// The high-resolution product is used when its file exists, the box lies strictly inside its
    /// latitude band, and `resolution_hint` (if any) is finer than the global product.
    pub fn select_product(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> &LunarProduct {
        let Some(hr) = &self.high_res else {
            return &self.global;
        };

        if !hr.path.exists() {
            info!("{} file not found at {}, using {}", hr.name, hr.path, self.global.name);
            return &self.global;
        }
        if let Some(hint) = resolution_hint {
            if hint.lon.min(hint.lat) >= self.global.resolution() {
                info!(
                    "Requested spacing of {:.2e} deg is met by {}, skipping {}",
                    hint.lon.min(hint.lat),
                    self.global.name,
                    hr.name
                );
                return &self.global;
            }
        }
        if hr.covers(bbox) {
            info!(
                "Elevation grid lies within {}S and {}N, using {}",
                hr.max_lat, hr.max_lat, hr.name
            );
            hr
        } else {
            info!(
                "Elevation grid extends beyond {}S or {}N, using {}",
                hr.max_lat, hr.max_lat, self.global.name
            );
            &self.global
        }
    }
}

impl RasterSource for LunarSource {
    fn load(
        &self,
        bbox: &BoundingBox,
        resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        let t_start = Instant::now();
        let product = self.select_product(bbox, resolution_hint);
        let window = pixel_window(
            product.pixels_per_degree,
            product.max_lat,
            product.west_edge,
            product.nrows(),
            bbox,
        )?;
        debug!(
            "Reading {} rows from {} in {} segment(s)",
            window.nrows,
            product.name,
            window.segments.len()
        );

        let samples = product.read_window(&window)?;
        info!(
            "Read lunar elevation data ({}x{}) in {:.2} minutes",
            samples.nrows(),
            samples.ncols(),
            t_start.elapsed().as_secs_f64() / 60.0
        );
        window_grid(samples, &window, product.pixels_per_degree)
    }
}
