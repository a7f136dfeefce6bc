//! Histogram implementation for latency tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Histogram of microsecond values with an overflow bucket
pub struct Histogram {
    /// Upper bucket boundaries (inclusive, in microseconds)
    bounds: Vec<u64>,
    /// Counts per bucket; one extra slot for values above the last bound
    counts: Vec<AtomicU64>,
    sum: AtomicU64,
    count: AtomicU64,
    max: AtomicU64,
}

impl Histogram {
    /// Create histogram with default buckets (100us to 5s)
    pub fn new() -> Self {
        Self::with_bounds(vec![
            100, 250, 500, 1_000, 2_500, 5_000, 10_000, 50_000, 250_000, 1_000_000, 5_000_000,
        ])
    }

    /// Create histogram with custom bucket bounds
    pub fn with_bounds(mut bounds: Vec<u64>) -> Self {
        bounds.sort_unstable();
        bounds.dedup();
        let counts = (0..=bounds.len()).map(|_| AtomicU64::new(0)).collect();
        Histogram {
            bounds,
            counts,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
            max: AtomicU64::new(0),
        }
    }

    /// Record a value in microseconds
    pub fn observe(&self, micros: u64) {
        self.sum.fetch_add(micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.max.fetch_max(micros, Ordering::Relaxed);

        let slot = self.bounds.partition_point(|bound| *bound < micros);
        self.counts[slot].fetch_add(1, Ordering::Relaxed);
    }

    /// Record a duration
    pub fn observe_duration(&self, elapsed: Duration) {
        self.observe(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
    }

    /// Get mean value
    pub fn mean(&self) -> f64 {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        self.sum.load(Ordering::Relaxed) as f64 / count as f64
    }

    /// Largest observed value
    pub fn max(&self) -> u64 {
        self.max.load(Ordering::Relaxed)
    }

    /// Get total count
    pub fn total_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// `(upper bound, count)` per bucket; the overflow bucket has no bound
    pub fn buckets(&self) -> Vec<(Option<u64>, u64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, c)| (self.bounds.get(i).copied(), c.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}
