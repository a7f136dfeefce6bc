//! Metrics export and snapshot functionality

use crate::{Histogram, ReaderMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of all metrics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Counter values
    pub counters: BTreeMap<String, u64>,
    /// Histogram summaries
    pub histograms: BTreeMap<String, HistogramSummary>,
}

/// Summary of a histogram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Mean value in microseconds
    pub mean_us: f64,
    /// Largest value in microseconds
    pub max_us: u64,
    /// Total observation count
    pub count: u64,
    /// Per-bucket counts keyed by upper bound (`"inf"` for overflow)
    pub buckets: BTreeMap<String, u64>,
}

impl HistogramSummary {
    fn from_histogram(h: &Histogram) -> Self {
        let buckets = h
            .buckets()
            .into_iter()
            .map(|(bound, count)| {
                let key = bound.map_or_else(|| "inf".to_string(), |b| format!("le_{}", b));
                (key, count)
            })
            .collect();
        Self {
            mean_us: h.mean(),
            max_us: h.max(),
            count: h.total_count(),
            buckets,
        }
    }
}

impl MetricsSnapshot {
    /// Create a snapshot from reader metrics
    pub fn from_metrics(metrics: &ReaderMetrics) -> Self {
        let counters = metrics
            .all_counters()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let mut histograms = BTreeMap::new();
        histograms.insert(
            "store_fetch".to_string(),
            HistogramSummary::from_histogram(&metrics.store_fetch),
        );
        histograms.insert(
            "fusion".to_string(),
            HistogramSummary::from_histogram(&metrics.fusion),
        );

        Self {
            counters,
            histograms,
        }
    }

    /// Export snapshot as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export snapshot as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
