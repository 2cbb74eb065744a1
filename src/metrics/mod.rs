//! Metrics collection and monitoring module
//!
//! Counters for the refresh loop, read by the footer each frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of the refresh counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshStats {
    pub cycles: u64,
    pub failed_fetches: u64,
    pub last_cycle_ms: u64,
}

/// Refresh-cycle counters shared between the refresh loop and the renderer
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    cycles: AtomicU64,
    failed_fetches: AtomicU64,
    last_cycle_ms: AtomicU64,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed (or interrupted) cycle
    pub fn record_cycle(&self, failed: usize, elapsed: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.failed_fetches
            .fetch_add(failed as u64, Ordering::Relaxed);
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.last_cycle_ms.store(ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RefreshStats {
        RefreshStats {
            cycles: self.cycles.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
            last_cycle_ms: self.last_cycle_ms.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_metrics_accumulate() {
        let metrics = RefreshMetrics::new();
        metrics.record_cycle(0, Duration::from_millis(120));
        metrics.record_cycle(2, Duration::from_millis(340));

        let stats = metrics.snapshot();
        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.failed_fetches, 2);
        assert_eq!(stats.last_cycle_ms, 340);
    }

    #[test]
    fn test_refresh_stats_default() {
        assert_eq!(RefreshMetrics::default().snapshot(), RefreshStats::default());
    }
}
