//! # Terrestrial elevation from SRTM tiles
//!
//! [`SrtmSource`](crate::raster::srtm::SrtmSource) builds an elevation grid for any box on Earth
//! from 1°×1° SRTM `.hgt` tiles stored in a local directory.
//!
//! ## Tile format
//!
//! * Named after the south-west corner: `N38W080.hgt` covers 38°N–39°N, 80°W–79°W.
//! * Square grid of `(spd + 1)²` big-endian `i16` samples (`spd` = samples per degree,
//!   3600 for the 1 arc-second product), row 0 on the **north** edge, column 0 on the **west** edge.
//! * Adjacent tiles share their edge rows/columns.
//! * `-32768` marks a void; voids are replaced by 0 m and reported with `warn!`.
//!
//! ## Mosaic indexing
//!
//! Samples are addressed on a virtual global lattice `(q, c)` with `lat = q / spd`,
//! `lon = c / spd`. `c` is unbounded, so boxes straddling the antimeridian map onto tiles near
//! both ends of the longitude range without special casing. Tiles are downloaded and clipped by
//! an external tool; a missing tile is a [`HorizonError::DataUnavailable`].

use std::collections::HashMap;
use std::fs;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use log::{debug, info, warn};
use nalgebra::DMatrix;

use crate::bounding_box::BoundingBox;
use crate::constants::{ARCSEC_PER_DEG, SRTM_VOID};
use crate::horizon_errors::HorizonError;
use crate::raster::{ElevationGrid, GridGeometry, RasterSource, Resolution, RowOrder};

/// Terrestrial raster source reading SRTM `.hgt` tiles.
#[derive(Debug, Clone)]
pub struct SrtmSource {
    tile_dir: Utf8PathBuf,
    samples_per_degree: i64,
}

impl SrtmSource {
    /// 1 arc-second tiles stored in `tile_dir`.
    pub fn new(tile_dir: impl Into<Utf8PathBuf>) -> Self {
        SrtmSource {
            tile_dir: tile_dir.into(),
            samples_per_degree: ARCSEC_PER_DEG as i64,
        }
    }

    /// Tiles with another sampling, e.g. 1200 for the 3 arc-second product.
    pub fn with_samples_per_degree(
        tile_dir: impl Into<Utf8PathBuf>,
        samples_per_degree: u32,
    ) -> Result<Self, HorizonError> {
        if samples_per_degree == 0 {
            return Err(HorizonError::InvalidConfiguration(
                "samples_per_degree must be >= 1".into(),
            ));
        }
        Ok(SrtmSource {
            tile_dir: tile_dir.into(),
            samples_per_degree: samples_per_degree as i64,
        })
    }

    /// 1 arc-second tiles stored in the user cache directory, `<cache>/skyline_cache/srtm`.
    pub fn from_cache_dir() -> Result<Self, HorizonError> {
        let base_dir = BaseDirs::new().ok_or_else(|| {
            HorizonError::DataUnavailable("cannot find the user cache directory".into())
        })?;
        let cache_path = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
            HorizonError::DataUnavailable("user cache directory is not valid UTF-8".into())
        })?;
        Ok(SrtmSource::new(cache_path.join("skyline_cache").join("srtm")))
    }

    pub fn tile_dir(&self) -> &Utf8Path {
        &self.tile_dir
    }

    fn side(&self) -> usize {
        self.samples_per_degree as usize + 1
    }

    /// Read one tile as row-major samples, voids replaced by 0.
    fn read_tile(&self, lat: i32, lon: i32) -> Result<Vec<i16>, HorizonError> {
        let name = tile_name(lat, lon);
        let path = self.tile_dir.join(format!("{name}.hgt"));
        if !path.exists() {
            return Err(HorizonError::DataUnavailable(format!(
                "SRTM tile {name} not found in {}",
                self.tile_dir
            )));
        }

        let bytes = fs::read(&path)?;
        let side = self.side();
        if bytes.len() != side * side * 2 {
            return Err(HorizonError::DataUnavailable(format!(
                "SRTM tile {path} has {} bytes, expected {} for {side}x{side} samples",
                bytes.len(),
                side * side * 2
            )));
        }

        let mut voids = 0usize;
        let samples = bytes
            .chunks_exact(2)
            .map(|b| match i16::from_be_bytes([b[0], b[1]]) {
                SRTM_VOID => {
                    voids += 1;
                    0
                }
                h => h,
            })
            .collect();

        if voids > 0 {
            warn!("SRTM tile {name}: {voids} void samples replaced by 0 m");
        }
        debug!("Read SRTM tile {path}");
        Ok(samples)
    }
}

/// SRTM file stem of the tile whose south-west corner is `(lat, lon)`, e.g. `N38W080`.
///
/// `lon` is folded into [-180, 180) first.
pub fn tile_name(lat: i32, lon: i32) -> String {
    let lon = (lon + 180).rem_euclid(360) - 180;
    let lat_prefix = if lat >= 0 { "N" } else { "S" };
    let lon_prefix = if lon >= 0 { "E" } else { "W" };
    format!(
        "{}{:02}{}{:03}",
        lat_prefix,
        lat.abs(),
        lon_prefix,
        lon.abs()
    )
}

impl RasterSource for SrtmSource {
    /// Tiles have a single resolution; the hint is ignored.
    fn load(
        &self,
        bbox: &BoundingBox,
        _resolution_hint: Option<Resolution>,
    ) -> Result<ElevationGrid, HorizonError> {
        let t_start = Instant::now();
        let spd = self.samples_per_degree;
        let side = self.side();

        // lattice indices, rounded outward
        let c0 = (bbox.west * spd as f64).floor() as i64;
        let c1 = (bbox.east * spd as f64).ceil() as i64;
        let q0 = (bbox.south * spd as f64).floor() as i64;
        let q1 = (bbox.north * spd as f64).ceil() as i64;

        let nrows = (q1 - q0 + 1) as usize;
        let ncols = (c1 - c0 + 1) as usize;
        let mut samples = DMatrix::<f64>::zeros(nrows, ncols);
        let mut tiles: HashMap<(i32, i32), Vec<i16>> = HashMap::new();

        for (i, q) in (q0..=q1).rev().enumerate() {
            // boundary rows come from the tile above, except on the northern edge of the box
            let (tile_lat, row) = if q == q1 && q.rem_euclid(spd) == 0 {
                (q.div_euclid(spd) as i32 - 1, 0)
            } else {
                (
                    q.div_euclid(spd) as i32,
                    (spd - q.rem_euclid(spd)) as usize,
                )
            };

            let mut c = c0;
            while c <= c1 {
                // boundary columns come from the tile to the east, except on the eastern edge
                let (lam, seg_end) = if c == c1 && c.rem_euclid(spd) == 0 {
                    (c.div_euclid(spd) - 1, c1)
                } else {
                    let lam = c.div_euclid(spd);
                    (lam, c1.min((lam + 1) * spd - 1))
                };
                let tile_lon = (lam as i32 + 180).rem_euclid(360) - 180;

                if !tiles.contains_key(&(tile_lat, tile_lon)) {
                    let tile = self.read_tile(tile_lat, tile_lon)?;
                    tiles.insert((tile_lat, tile_lon), tile);
                }
                let tile = &tiles[&(tile_lat, tile_lon)];

                for cc in c..=seg_end {
                    let col = (cc - lam * spd) as usize;
                    samples[(i, (cc - c0) as usize)] = tile[row * side + col] as f64;
                }
                c = seg_end + 1;
            }
        }

        info!(
            "Mosaicked {} SRTM tile(s) into a {}x{} grid in {:.2}s",
            tiles.len(),
            nrows,
            ncols,
            t_start.elapsed().as_secs_f64()
        );

        ElevationGrid::new(
            samples,
            GridGeometry {
                first_lon: c0 as f64 / spd as f64,
                first_lat: q1 as f64 / spd as f64,
                resolution: Resolution::uniform(1.0 / spd as f64),
                row_order: RowOrder::NorthToSouth,
            },
        )
    }
}
