use std::time::Duration;
use tracing::debug;
use treestats_core::StatKind;

/// Hook notified after each cold-cache statistic computation.
///
/// Purely observational: an implementation cannot fail the read, and the
/// engine behaves identically with no hook installed.
pub trait StatsObserver: Send + Sync {
    fn record(&self, stat: StatKind, item_key: &str, elapsed: Duration);
}

/// Observer that reports computations through `tracing`.
pub struct LoggingObserver;

impl StatsObserver for LoggingObserver {
    fn record(&self, stat: StatKind, item_key: &str, elapsed: Duration) {
        debug!("computed {} for {} in {:?}", stat, item_key, elapsed);
    }
}
