//! # Constants and type definitions for Skyline
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **unit
//! aliases** used throughout the crate, together with the default search constants of the
//! horizon computation.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians, arc-seconds ↔ degrees)
//! - Volumetric mean radii of the supported bodies
//! - Default angular search window and raster resolutions
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const DEGRAD: f64 = 180.0 / std::f64::consts::PI;

/// Arc-seconds per degree
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Bodies
// -------------------------------------------------------------------------------------------------

/// Earth volumetric mean radius in meters
pub const EARTH_MEAN_RADIUS: f64 = 6.371_000e6;

/// Moon volumetric mean radius in meters
pub const MOON_MEAN_RADIUS: f64 = 1.737_4e6;

// -------------------------------------------------------------------------------------------------
// Search defaults
// -------------------------------------------------------------------------------------------------

/// Smallest angular distance sampled along a ray (degrees).
///
/// The horizon angle formula contains `cot(γ)`, which diverges at γ = 0.
pub const DEFAULT_GAMMA_MIN: f64 = 0.005;

/// Default spline degree used by the elevation interpolator
pub const DEFAULT_SPLINE_DEGREE: usize = 3;

/// Highest spline degree supported by the interpolator
pub const MAX_SPLINE_DEGREE: usize = 5;

/// Default azimuth sampling step of the swept bounding-box policy (degrees)
pub const DEFAULT_SWEEP_STEP: f64 = 0.01;

/// Default number of azimuths in a profile (one per degree, both ends included)
pub const DEFAULT_N_ALPHA: usize = 361;

/// Default number of angular distances sampled along each azimuth
pub const DEFAULT_N_GAMMA: usize = 1000;

/// SRTM 1 arc-second resolution (degrees per sample)
pub const SRTM_RESOLUTION: f64 = 1.0 / ARCSEC_PER_DEG;

/// SRTM void marker
pub const SRTM_VOID: i16 = -32768;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
