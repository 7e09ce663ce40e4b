//! Wall-clock bookkeeping of an azimuth sweep, shown in the profile progress bar.
//!
//! Enabled with the `progress` feature, together with
//! [`HorizonModel::profile_with_progress_bar`](crate::calculator::HorizonModel::profile_with_progress_bar).
//!
//! Every completed azimuth is reported as
//!
//! ```text
//! azimuth 137.5° (56/145) in 0.412 s | mean 0.398 s
//! ```
//!
//! and the sweep ends with one `info!` line giving the total time and the slowest azimuth.

use std::time::{Duration, Instant};

use log::info;

use crate::constants::Degree;

/// Timing of the azimuths of one profile.
#[derive(Debug, Clone)]
pub struct SweepClock {
    started: Instant,
    last: Instant,
    n_alpha: usize,
    done: usize,
    slowest: Option<(usize, Duration)>,
}

impl SweepClock {
    /// Start timing a sweep over `n_alpha` azimuths (0° and 360° included).
    pub fn start(n_alpha: usize) -> Self {
        let now = Instant::now();
        SweepClock {
            started: now,
            last: now,
            n_alpha,
            done: 0,
            slowest: None,
        }
    }

    /// Record the completion of the next azimuth and return the time it took.
    pub fn azimuth_done(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;

        let index = self.done;
        self.done += 1;
        match self.slowest {
            Some((_, worst)) if dt <= worst => {}
            _ => self.slowest = Some((index, dt)),
        }
        dt
    }

    #[inline]
    pub fn done(&self) -> usize {
        self.done
    }

    /// Azimuth of the `index`-th sample, degrees.
    pub fn azimuth(&self, index: usize) -> Degree {
        if self.n_alpha < 2 {
            0.0
        } else {
            360.0 * index as f64 / (self.n_alpha - 1) as f64
        }
    }

    /// Mean time per completed azimuth.
    pub fn mean(&self) -> Duration {
        match self.done {
            0 => Duration::ZERO,
            n => self.started.elapsed() / n as u32,
        }
    }

    /// Progress bar message for the azimuth just completed in `last`.
    pub fn message(&self, last: Duration) -> String {
        azimuth_message(
            self.azimuth(self.done.saturating_sub(1)),
            self.done,
            self.n_alpha,
            last,
            self.mean(),
        )
    }

    /// Log the summary of the sweep.
    pub fn finish(&self) {
        let total = self.started.elapsed();
        match self.slowest {
            Some((index, worst)) => info!(
                "Horizon profile of {}/{} azimuths in {:.2} s, slowest at {:.1}° ({:.3} s)",
                self.done,
                self.n_alpha,
                total.as_secs_f64(),
                self.azimuth(index),
                worst.as_secs_f64()
            ),
            None => info!("Horizon profile stopped before the first azimuth"),
        }
    }
}

/// `azimuth 137.5° (56/145) in 0.412 s | mean 0.398 s`
pub fn azimuth_message(
    azimuth: Degree,
    done: usize,
    n_alpha: usize,
    last: Duration,
    mean: Duration,
) -> String {
    format!(
        "azimuth {azimuth:.1}° ({done}/{n_alpha}) in {:.3} s | mean {:.3} s",
        last.as_secs_f64(),
        mean.as_secs_f64()
    )
}

#[cfg(test)]
mod progress_bar_test {
    use super::*;

    #[test]
    fn test_azimuth_message() {
        let msg = azimuth_message(
            137.5,
            56,
            145,
            Duration::from_millis(412),
            Duration::from_millis(398),
        );
        assert_eq!(msg, "azimuth 137.5° (56/145) in 0.412 s | mean 0.398 s");
    }

    #[test]
    fn test_clock_follows_the_sweep() {
        let mut clock = SweepClock::start(5);
        assert_eq!(clock.done(), 0);
        assert_eq!(clock.mean(), Duration::ZERO);

        for _ in 0..3 {
            clock.azimuth_done();
        }
        assert_eq!(clock.done(), 3);
        assert_eq!(clock.azimuth(2), 180.0);
        assert_eq!(clock.azimuth(4), 360.0);
        assert!(clock.message(Duration::ZERO).starts_with("azimuth 180.0° (3/5)"));
        assert!(clock.slowest.is_some_and(|(i, _)| i < 3));
    }
}
