//! Per-pipeline item counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated as items move through a pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    received: AtomicU64,
    completed: AtomicU64,
    rejected: AtomicU64,
    short_circuited: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
}

impl PipelineStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new item and marks it in flight until the guard drops.
    pub fn record_received(&self) -> InFlightGuard<'_> {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard { stats: self }
    }

    /// Records an item that completed without failure.
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an item rejected by the context-create hook.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an item whose chain stopped before its last middleware.
    pub fn record_short_circuited(&self) {
        self.short_circuited.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed item.
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            short_circuited: self.short_circuited.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

/// Decrements the in-flight counter when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    stats: &'a PipelineStats,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// A copy of [`PipelineStats`] at one moment.
///
/// `short_circuited` items are also counted in `completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatsSnapshot {
    /// Items handed to the pipeline.
    pub received: u64,
    /// Items that finished without failure.
    pub completed: u64,
    /// Items rejected by the context-create hook.
    pub rejected: u64,
    /// Items whose chain was stopped early by a middleware.
    pub short_circuited: u64,
    /// Items that failed.
    pub failed: u64,
    /// Items currently being processed.
    pub in_flight: u64,
}

impl PipelineStatsSnapshot {
    /// Returns the failure rate as a percentage of finished items.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        let finished = self.completed + self.rejected + self.failed;
        if finished == 0 {
            0.0
        } else {
            (self.failed as f64 / finished as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PipelineStats::new();
        {
            let _guard = stats.record_received();
            assert_eq!(stats.snapshot().in_flight, 1);
            stats.record_completed();
        }
        {
            let _guard = stats.record_received();
            stats.record_failed();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.in_flight, 0);
        assert!((snapshot.failure_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_failure_rate() {
        assert!(PipelineStatsSnapshot::default().failure_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = PipelineStats::new();
        stats.record_rejected();
        stats.record_short_circuited();

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["rejected"], 1);
        assert_eq!(json["short_circuited"], 1);
    }
}
