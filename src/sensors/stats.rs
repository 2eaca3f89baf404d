//! Fixed-size rolling window over the most recent readings.
//!
//! Keeps the last `N` samples in a ring buffer and summarises them as
//! mean, median, population standard deviation, min and max.  Used for the
//! TDS, EC and temperature series reported in telemetry.

use serde::Serialize;

/// Number of points kept per series.
pub const WINDOW_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadingStats {
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

pub struct RollingWindow<const N: usize> {
    ring: [f32; N],
    head: usize,
    count: usize,
}

impl<const N: usize> Default for RollingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RollingWindow<N> {
    pub const fn new() -> Self {
        Self {
            ring: [0.0; N],
            head: 0,
            count: 0,
        }
    }

    /// Push a sample, evicting the oldest once full.  Non-finite samples
    /// are dropped so one bad reading cannot poison the summary.
    pub fn push(&mut self, value: f32) {
        if N == 0 || !value.is_finite() {
            return;
        }
        self.ring[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Summary of the window, `None` while empty.
    pub fn stats(&self) -> Option<ReadingStats> {
        if self.count == 0 {
            return None;
        }
        let samples = &self.ring[..self.count];
        let n = self.count as f32;

        let mean = samples.iter().sum::<f32>() / n;
        let variance = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
        let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
        let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut sorted = [0.0_f32; N];
        sorted[..self.count].copy_from_slice(samples);
        let sorted = &mut sorted[..self.count];
        sorted.sort_unstable_by(f32::total_cmp);
        let mid = self.count / 2;
        let median = if self.count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(ReadingStats {
            mean,
            median,
            std_dev: variance.sqrt(),
            min,
            max,
            count: self.count,
        })
    }
}
