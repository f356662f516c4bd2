//! Percent-of-peak normalization for rate channels.
//!
//! No link or device capacity is known, so a rate gauge reads relative to
//! the highest rate seen so far in this process. The peak only grows until
//! [`ThroughputNormalizer::reset`] is called.

use crate::metrics::units::{self, UNIT_STEP};

/// Initial peak. Also keeps the percentage finite before any traffic.
const INITIAL_PEAK: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ThroughputNormalizer {
    current: f64,
    peak: f64,
}

impl Default for ThroughputNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ThroughputNormalizer {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            peak: INITIAL_PEAK,
        }
    }

    /// Feed one raw per-tick value and return it as a percentage of the
    /// observed peak.
    ///
    /// The raw value is divided once by [`UNIT_STEP`] (bytes to kilobytes,
    /// bits to kilobits). Negative or non-finite input is read as zero.
    pub fn update(&mut self, raw_per_tick: f64) -> f64 {
        let raw = if raw_per_tick.is_finite() {
            raw_per_tick.max(0.0)
        } else {
            0.0
        };

        self.current = raw / UNIT_STEP;
        self.peak = self.peak.max(self.current);
        self.percentage()
    }

    pub fn percentage(&self) -> f64 {
        self.current / self.peak * 100.0
    }

    /// Human-readable current rate, e.g. `(1.5, "MB/s")`.
    pub fn current_display<'a>(&self, unit_labels: &[&'a str]) -> (f64, &'a str) {
        units::scale(self.current, unit_labels)
    }

    /// Forget the observed peak.
    pub fn reset(&mut self) {
        self.peak = INITIAL_PEAK;
        self.current = 0.0;
    }
}
