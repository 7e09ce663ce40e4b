//! # Skyline
//!
//! Angular horizon profiles from digital elevation models.
//!
//! For an observer standing on a spherical body (Earth, Moon, …), Skyline computes the elevation
//! angle of the visible skyline as a function of azimuth, taking the curvature of the body into
//! account. It is meant for site selection of radio and astronomy instruments, where the terrain
//! blocking the low sky matters.
//!
//! ## Pipeline
//!
//! ```text
//! Observer + HorizonParams
//!        │
//!        ▼
//! bounding_box ──► RasterSource::load ──► ElevationField (B-spline)
//!                                                │
//!           projection + horizon_angle ◄─────────┘
//!                        │
//!                        ▼
//!                 HorizonProfile (max over γ, per azimuth)
//! ```
//!
//! * [`calculator`] – two-phase entry point: [`HorizonCalculator`](crate::calculator::HorizonCalculator)
//!   then [`HorizonModel`](crate::calculator::HorizonModel).
//! * [`profile`] – the azimuth × angular-distance sweep.
//! * [`raster`] – elevation sources: SRTM tiles, lunar global products, in-memory rasters.
//! * [`interpolation`] – tensor-product spline over the elevation grid.
//! * [`bounding_box`], [`projection`], [`horizon_angle`] – geometry.
//!
//! ## Features
//!
//! * `progress` – terminal progress bar for long sweeps (`indicatif`).
//! * `parallel` – azimuths computed on the `rayon` thread pool.
//!
//! Logging goes through the `log` facade; install any logger (e.g. `env_logger`) to see it.

pub mod body;
pub mod bounding_box;
pub mod calculator;
pub mod constants;
pub mod horizon_angle;
pub mod horizon_errors;
pub mod interpolation;
pub mod observer;
pub mod params;
pub mod profile;
#[cfg(feature = "progress")]
pub mod progress_bar;
pub mod projection;
pub mod raster;

