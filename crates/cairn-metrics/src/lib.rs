//! # cairn-metrics
//!
//! Read-path observability for Cairn.
//!
//! Features:
//! - Lock-free outcome counters (row fetches, archive fallbacks, faults)
//! - Latency histograms for store fetches and fusion
//! - JSON snapshot export

#![warn(missing_docs)]
#![warn(clippy::all)]

mod export;
mod histogram;
mod reader;

pub use export::{HistogramSummary, MetricsSnapshot};
pub use histogram::Histogram;
pub use reader::{ReadEvent, ReaderMetrics};

/// Time a block of code into a [`Histogram`]
#[macro_export]
macro_rules! timed {
    ($histogram:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        $histogram.observe_duration(start.elapsed());
        result
    }};
}
