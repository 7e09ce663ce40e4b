//! # Horizon profile engine
//!
//! Sweep azimuths × angular distances on a prepared [`HorizonModel`] and keep, for each azimuth,
//! the **largest** horizon angle met along the ray. The apparent angle is not monotonic in `γ`:
//! a near ridge can hide a farther, higher mountain, and the visible skyline is the maximum.
//!
//! ## Sampling
//!
//! ```text
//! azimuths α_i = i · 360 / (N_alpha − 1)                    i = 0 .. N_alpha−1   (0° and 360° included)
//! distances γ_j = gamma_min + j · (gamma_max − gamma_min) / (N_gamma − 1)
//! ```
//!
//! With `N_gamma = 1` only `gamma_min` is sampled. Ties between equal angles keep the smallest
//! distance.
//!
//! ## Variants
//!
//! * [`HorizonModel::profile`] – sequential sweep.
//! * [`HorizonModel::profile_with_progress`] – calls back once per completed azimuth.
//! * `HorizonModel::profile_with_progress_bar` – terminal progress bar (`progress` feature).
//! * `HorizonModel::par_profile` – azimuths spread over the rayon pool (`parallel` feature); the
//!   elevation field is shared read-only.
//!
//! A profile is all-or-nothing: a non-finite angle aborts the sweep with
//! [`HorizonError::NumericDegeneracy`].

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[cfg(feature = "progress")]
use crate::progress_bar::SweepClock;
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "progress")]
use std::time::Duration;

use crate::calculator::HorizonModel;
use crate::constants::{Degree, DEGRAD, RADEG};
use crate::horizon_errors::HorizonError;
use crate::params::linspace;

/// Skyline elevation in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPoint {
    /// Azimuth in **degrees**, 0 = north, clockwise.
    pub azimuth: Degree,
    /// Horizon angle in **degrees**, negative below the local horizontal.
    pub horizon_angle: Degree,
    /// Angular distance of the terrain defining the horizon, **degrees**, if requested.
    pub gamma: Option<Degree>,
}

/// Ordered horizon profile, azimuths strictly increasing from 0° to 360°.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProfile {
    points: Vec<HorizonPoint>,
}

impl HorizonProfile {
    #[inline]
    pub fn points(&self) -> &[HorizonPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HorizonPoint> {
        self.points.iter()
    }

    pub fn azimuths(&self) -> Vec<Degree> {
        self.points.iter().map(|p| p.azimuth).collect()
    }

    pub fn horizon_angles(&self) -> Vec<Degree> {
        self.points.iter().map(|p| p.horizon_angle).collect()
    }

    /// Defining distances, `None` unless every point carries one.
    pub fn defining_gammas(&self) -> Option<Vec<Degree>> {
        self.points.iter().map(|p| p.gamma).collect()
    }

    /// Highest point of the skyline (first one on ties).
    pub fn max(&self) -> Option<&HorizonPoint> {
        self.points
            .iter()
            .reduce(|best, p| if p.horizon_angle > best.horizon_angle { p } else { best })
    }

    /// Lowest point of the skyline (first one on ties).
    pub fn min(&self) -> Option<&HorizonPoint> {
        self.points
            .iter()
            .reduce(|best, p| if p.horizon_angle < best.horizon_angle { p } else { best })
    }
}

impl<'a> IntoIterator for &'a HorizonProfile {
    type Item = &'a HorizonPoint;
    type IntoIter = std::slice::Iter<'a, HorizonPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// `n_alpha` azimuths from 0° to 360°, both included.
pub fn azimuth_samples(n_alpha: usize) -> Vec<Degree> {
    linspace(0.0, 360.0, n_alpha)
}

fn check_sampling(n_alpha: usize, n_gamma: usize) -> Result<(), HorizonError> {
    if n_alpha < 2 {
        return Err(HorizonError::InvalidConfiguration(format!(
            "n_alpha must be >= 2 to include 0 and 360 degrees, got {n_alpha}"
        )));
    }
    if n_gamma < 1 {
        return Err(HorizonError::InvalidConfiguration(
            "n_gamma must be >= 1".into(),
        ));
    }
    Ok(())
}

impl HorizonModel {
    /// Angular distances sampled along every ray for `n_gamma` samples, degrees.
    pub fn gamma_samples(&self, n_gamma: usize) -> Vec<Degree> {
        let p = self.params();
        linspace(p.gamma_min, p.gamma_max, n_gamma)
    }

    /// Maximum horizon angle along one azimuth.
    ///
    /// Arguments
    /// -----------------
    /// * `azimuth`: direction in **degrees**.
    /// * `gammas`: angular distances to test, **degrees**, ascending and strictly positive.
    ///
    /// Return
    /// ----------
    /// * The [`HorizonPoint`] (with its defining distance when `record_gamma` is set), or
    ///   [`HorizonError::NumericDegeneracy`] if an angle is not finite or `gammas` is empty.
    pub fn horizon_at(&self, azimuth: Degree, gammas: &[Degree]) -> Result<HorizonPoint, HorizonError> {
        let alpha = azimuth * RADEG;
        let mut best: Option<(f64, Degree)> = None;

        for &gamma in gammas {
            let eta = self.horizon_angle(alpha, gamma * RADEG);
            if !eta.is_finite() {
                return Err(HorizonError::NumericDegeneracy(format!(
                    "non-finite horizon angle at azimuth {azimuth} deg, gamma {gamma} deg"
                )));
            }
            match best {
                Some((b, _)) if eta <= b => {}
                _ => best = Some((eta, gamma)),
            }
        }

        let (eta, gamma) = best.ok_or_else(|| {
            HorizonError::NumericDegeneracy(format!("no distance sampled at azimuth {azimuth} deg"))
        })?;
        Ok(HorizonPoint {
            azimuth,
            horizon_angle: eta * DEGRAD,
            gamma: self.params().record_gamma.then_some(gamma),
        })
    }

    /// Horizon profile with the sampling of the model parameters.
    pub fn default_profile(&self) -> Result<HorizonProfile, HorizonError> {
        let p = self.params();
        self.profile(p.n_alpha, p.n_gamma)
    }

    /// Horizon profile over `n_alpha` azimuths and `n_gamma` distances per azimuth.
    ///
    /// Return
    /// ----------
    /// * Exactly `n_alpha` points, azimuths `0, …, 360`, or
    ///   - [`HorizonError::InvalidConfiguration`] if `n_alpha < 2` or `n_gamma < 1`,
    ///   - [`HorizonError::NumericDegeneracy`] if any angle is not finite.
    pub fn profile(&self, n_alpha: usize, n_gamma: usize) -> Result<HorizonProfile, HorizonError> {
        self.profile_with_progress(n_alpha, n_gamma, |_, _| {})
    }

    /// Same as [`HorizonModel::profile`], calling `on_azimuth(done, total)` after each azimuth.
    pub fn profile_with_progress<F>(
        &self,
        n_alpha: usize,
        n_gamma: usize,
        mut on_azimuth: F,
    ) -> Result<HorizonProfile, HorizonError>
    where
        F: FnMut(usize, usize),
    {
        check_sampling(n_alpha, n_gamma)?;
        let gammas = self.gamma_samples(n_gamma);

        let points = azimuth_samples(n_alpha)
            .into_iter()
            .enumerate()
            .map(|(i, azimuth)| {
                let point = self.horizon_at(azimuth, &gammas);
                on_azimuth(i + 1, n_alpha);
                point
            })
            .try_collect::<_, Vec<_>, _>()?;

        Ok(HorizonProfile { points })
    }

    /// Horizon profile with a terminal progress bar reporting the time spent per azimuth.
    #[cfg(feature = "progress")]
    pub fn profile_with_progress_bar(
        &self,
        n_alpha: usize,
        n_gamma: usize,
    ) -> Result<HorizonProfile, HorizonError> {
        let pb = ProgressBar::new(n_alpha as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] {wide_bar} {pos}/{len} ETA {eta} | {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.enable_steady_tick(Duration::from_millis(200));

        let mut clock = SweepClock::start(n_alpha);
        let result = self.profile_with_progress(n_alpha, n_gamma, |_, _| {
            let last = clock.azimuth_done();
            pb.set_message(clock.message(last));
            pb.inc(1);
        });

        pb.finish_and_clear();
        clock.finish();
        result
    }

    /// Horizon profile with the azimuths spread over the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn par_profile(&self, n_alpha: usize, n_gamma: usize) -> Result<HorizonProfile, HorizonError> {
        check_sampling(n_alpha, n_gamma)?;
        let gammas = self.gamma_samples(n_gamma);

        let points = azimuth_samples(n_alpha)
            .into_par_iter()
            .map(|azimuth| self.horizon_at(azimuth, &gammas))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HorizonProfile { points })
    }
}

#[cfg(test)]
mod profile_test {
    use super::*;
    use crate::body::Body;
    use crate::calculator::HorizonCalculator;
    use crate::observer::Observer;
    use crate::params::HorizonParams;
    use crate::raster::{FunctionSource, Resolution};
    use approx::assert_relative_eq;

    /// 300 m high ridge along the meridian 0.2° east of the observer.
    fn ridge_model(record_gamma: bool) -> HorizonModel {
        let source = FunctionSource::new(Resolution::uniform(0.01), |lon, _| {
            300.0 * (-((lon - 0.2) / 0.03).powi(2)).exp()
        });
        let params = HorizonParams::builder()
            .record_gamma(record_gamma)
            .build()
            .unwrap();
        let obs = Observer::new(0.0, 0.0, None).unwrap();
        HorizonCalculator::new(obs, Body::earth(), params, source)
            .unwrap()
            .prepare()
            .unwrap()
    }

    #[test]
    fn test_azimuth_samples() {
        let az = azimuth_samples(5);
        assert_eq!(az, vec![0.0, 90.0, 180.0, 270.0, 360.0]);
        assert_eq!(azimuth_samples(2), vec![0.0, 360.0]);
    }

    #[test]
    fn test_ridge_raises_the_eastern_horizon() {
        let model = ridge_model(true);
        let profile = model.profile(9, 200).unwrap();

        let east = profile.points()[2];
        let west = profile.points()[6];
        assert_eq!(east.azimuth, 90.0);
        assert!(east.horizon_angle > 0.5);
        assert!(west.horizon_angle < 0.0);

        // the ridge crest sets the eastern horizon
        let gamma = east.gamma.unwrap();
        assert!((gamma - 0.2).abs() < 0.02);

        let highest = profile.max().unwrap();
        assert_eq!(highest.azimuth, 90.0);
        assert!(profile.min().unwrap().horizon_angle < 0.0);
    }

    #[test]
    fn test_gamma_recorded_only_on_request() {
        let profile = ridge_model(false).profile(5, 10).unwrap();
        assert!(profile.iter().all(|p| p.gamma.is_none()));
        assert_eq!(profile.defining_gammas(), None);

        let profile = ridge_model(true).profile(5, 10).unwrap();
        assert_eq!(profile.defining_gammas().map(|g| g.len()), Some(5));
    }

    #[test]
    fn test_single_gamma_uses_gamma_min() {
        let model = ridge_model(true);
        let profile = model.profile(3, 1).unwrap();
        for p in &profile {
            assert_eq!(p.gamma, Some(0.005));
        }
    }

    #[test]
    fn test_progress_is_reported_per_azimuth() {
        let model = ridge_model(false);
        let mut calls = Vec::new();
        let profile = model
            .profile_with_progress(7, 20, |done, total| calls.push((done, total)))
            .unwrap();

        assert_eq!(profile.len(), 7);
        assert_eq!(calls.len(), 7);
        assert_eq!(calls.first(), Some(&(1, 7)));
        assert_eq!(calls.last(), Some(&(7, 7)));
    }

    #[test]
    fn test_first_and_last_azimuth_agree() {
        let profile = ridge_model(false).profile(13, 50).unwrap();
        let angles = profile.horizon_angles();
        assert_relative_eq!(angles[0], angles[12], epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_sampling() {
        let model = ridge_model(false);
        assert!(matches!(
            model.profile(1, 10),
            Err(HorizonError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            model.profile(10, 0),
            Err(HorizonError::InvalidConfiguration(_))
        ));
        assert!(model.horizon_at(0.0, &[]).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let model = ridge_model(true);
        assert_eq!(model.profile(37, 40).unwrap(), model.par_profile(37, 40).unwrap());
    }
}
