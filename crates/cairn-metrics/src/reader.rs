//! Block reader metrics

use crate::Histogram;
use std::sync::atomic::{AtomicU64, Ordering};

const EVENT_COUNT: usize = 11;

/// Countable outcome of a read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadEvent {
    /// A live row was fetched
    RowFetched,
    /// A hash-index row was fetched
    IndexFetched,
    /// The live row was absent and the archive was consulted
    ArchiveFallback,
    /// A finality tier held competing hashes
    AmbiguousTier,
    /// A row failed validation
    InvalidRow,
    /// A store call exceeded the request timeout
    Timeout,
    /// A store call failed
    StoreError,
    /// Nothing exists for the request
    NotFound,
    /// Data exists but cannot be served yet
    NotAvailable,
    /// A block was fused
    BlockFused,
    /// A single transaction was fused
    TransactionFused,
}

impl ReadEvent {
    /// All events in snapshot order
    pub const ALL: [ReadEvent; EVENT_COUNT] = [
        ReadEvent::RowFetched,
        ReadEvent::IndexFetched,
        ReadEvent::ArchiveFallback,
        ReadEvent::AmbiguousTier,
        ReadEvent::InvalidRow,
        ReadEvent::Timeout,
        ReadEvent::StoreError,
        ReadEvent::NotFound,
        ReadEvent::NotAvailable,
        ReadEvent::BlockFused,
        ReadEvent::TransactionFused,
    ];

    /// Counter name
    pub fn name(&self) -> &'static str {
        match self {
            ReadEvent::RowFetched => "row_fetches",
            ReadEvent::IndexFetched => "index_fetches",
            ReadEvent::ArchiveFallback => "archive_fallbacks",
            ReadEvent::AmbiguousTier => "ambiguous_tiers",
            ReadEvent::InvalidRow => "invalid_rows",
            ReadEvent::Timeout => "timeouts",
            ReadEvent::StoreError => "store_errors",
            ReadEvent::NotFound => "not_found",
            ReadEvent::NotAvailable => "not_available",
            ReadEvent::BlockFused => "blocks_fused",
            ReadEvent::TransactionFused => "transactions_fused",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Thread-safe reader metrics
pub struct ReaderMetrics {
    counters: [AtomicU64; EVENT_COUNT],
    /// Latency of store calls (row, index and archive)
    pub store_fetch: Histogram,
    /// Latency of fusion on an in-memory row
    pub fusion: Histogram,
}

impl ReaderMetrics {
    /// Create a zeroed metrics store
    pub fn new() -> Self {
        Self {
            counters: Default::default(),
            store_fetch: Histogram::new(),
            fusion: Histogram::new(),
        }
    }

    /// Count one event
    pub fn record(&self, event: ReadEvent) {
        self.counters[event.slot()].fetch_add(1, Ordering::Relaxed);
    }

    /// Current count of an event
    pub fn count(&self, event: ReadEvent) -> u64 {
        self.counters[event.slot()].load(Ordering::Relaxed)
    }

    /// All counter names and values
    pub fn all_counters(&self) -> Vec<(&'static str, u64)> {
        ReadEvent::ALL
            .iter()
            .map(|e| (e.name(), self.count(*e)))
            .collect()
    }
}

impl Default for ReaderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let metrics = ReaderMetrics::new();
        metrics.record(ReadEvent::RowFetched);
        metrics.record(ReadEvent::RowFetched);
        metrics.record(ReadEvent::Timeout);
        assert_eq!(metrics.count(ReadEvent::RowFetched), 2);
        assert_eq!(metrics.count(ReadEvent::Timeout), 1);
        assert_eq!(metrics.count(ReadEvent::NotFound), 0);
    }

    #[test]
    fn test_slots_are_distinct() {
        for (i, event) in ReadEvent::ALL.iter().enumerate() {
            assert_eq!(event.slot(), i);
        }
    }

    #[test]
    fn test_timed_macro() {
        let metrics = ReaderMetrics::new();
        let value = crate::timed!(metrics.fusion, { 40 + 2 });
        assert_eq!(value, 42);
        assert_eq!(metrics.fusion.total_count(), 1);
    }
}
