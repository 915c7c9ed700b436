//! Protocol counters.
//!
//! The engine records into a shared [`DvMetrics`]; hosts read it through
//! [`DvMetrics::snapshot`] from any thread.
//!
//! ```ignore
//! let metrics = engine.metrics();
//! let snapshot = metrics.snapshot();
//! println!("{} advertisements applied", snapshot.advertisements_applied);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::MergeReport;

/// Thread-safe protocol counters.
#[derive(Debug, Default)]
pub struct DvMetrics {
    pub hellos_sent: AtomicU64,
    pub hellos_received: AtomicU64,
    /// Advertisement requests expressed (retries included)
    pub requests_sent: AtomicU64,
    pub retries: AtomicU64,
    pub timeouts: AtomicU64,
    pub nacks: AtomicU64,
    pub validation_failures: AtomicU64,
    pub decode_failures: AtomicU64,
    /// Replies merged into the table
    pub advertisements_applied: AtomicU64,
    /// Our table sent to a neighbor
    pub advertisements_served: AtomicU64,
    /// Requests left unanswered because our table exceeds the message limit
    pub oversized_advertisements: AtomicU64,
    pub stale_updates_ignored: AtomicU64,
    pub loops_suppressed: AtomicU64,
    /// Selected-route changes (added, changed or removed)
    pub route_changes: AtomicU64,
    pub neighbors_discovered: AtomicU64,
    pub neighbors_stale: AtomicU64,
    pub neighbors_evicted: AtomicU64,
}

impl DvMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hello_sent(&self) {
        self.hellos_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hello_received(&self) {
        self.hellos_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_sent(&self, is_retry: bool) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        if is_retry {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_nack(&self) {
        self.nacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_advertisement_served(&self) {
        self.advertisements_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_oversized_advertisement(&self) {
        self.oversized_advertisements.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one merged advertisement.
    pub fn record_merge(&self, report: &MergeReport) {
        self.advertisements_applied.fetch_add(1, Ordering::Relaxed);
        self.stale_updates_ignored
            .fetch_add(report.stale_ignored as u64, Ordering::Relaxed);
        self.loops_suppressed
            .fetch_add(report.loops_suppressed as u64, Ordering::Relaxed);
        self.record_route_changes(report.changed.len());
    }

    pub fn record_route_changes(&self, count: usize) {
        self.route_changes.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_neighbor_discovered(&self) {
        self.neighbors_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_neighbor_stale(&self) {
        self.neighbors_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_neighbor_evicted(&self) {
        self.neighbors_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> DvMetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DvMetricsSnapshot {
            hellos_sent: load(&self.hellos_sent),
            hellos_received: load(&self.hellos_received),
            requests_sent: load(&self.requests_sent),
            retries: load(&self.retries),
            timeouts: load(&self.timeouts),
            nacks: load(&self.nacks),
            validation_failures: load(&self.validation_failures),
            decode_failures: load(&self.decode_failures),
            advertisements_applied: load(&self.advertisements_applied),
            advertisements_served: load(&self.advertisements_served),
            oversized_advertisements: load(&self.oversized_advertisements),
            stale_updates_ignored: load(&self.stale_updates_ignored),
            loops_suppressed: load(&self.loops_suppressed),
            route_changes: load(&self.route_changes),
            neighbors_discovered: load(&self.neighbors_discovered),
            neighbors_stale: load(&self.neighbors_stale),
            neighbors_evicted: load(&self.neighbors_evicted),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.hellos_sent,
            &self.hellos_received,
            &self.requests_sent,
            &self.retries,
            &self.timeouts,
            &self.nacks,
            &self.validation_failures,
            &self.decode_failures,
            &self.advertisements_applied,
            &self.advertisements_served,
            &self.oversized_advertisements,
            &self.stale_updates_ignored,
            &self.loops_suppressed,
            &self.route_changes,
            &self.neighbors_discovered,
            &self.neighbors_stale,
            &self.neighbors_evicted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DvMetricsSnapshot {
    pub hellos_sent: u64,
    pub hellos_received: u64,
    pub requests_sent: u64,
    pub retries: u64,
    pub timeouts: u64,
    pub nacks: u64,
    pub validation_failures: u64,
    pub decode_failures: u64,
    pub advertisements_applied: u64,
    pub advertisements_served: u64,
    pub oversized_advertisements: u64,
    pub stale_updates_ignored: u64,
    pub loops_suppressed: u64,
    pub route_changes: u64,
    pub neighbors_discovered: u64,
    pub neighbors_stale: u64,
    pub neighbors_evicted: u64,
}
