// # Metrics Sink Trait
//
// Observability output of the synchronizer. The exposition format and
// the serving path belong to the embedding process (see `ddnsd`).

use chrono::{DateTime, Utc};

/// Receiver for per-record observability signals
///
/// Implementations are shared between the sync loop and whatever serves
/// the values, so they must be safe under concurrent reads and writes.
pub trait MetricsSink: Send + Sync {
    /// Record that `record_name` was inspected and currently resolves to `address`
    fn record_address(&self, address: &str, record_name: &str);

    /// Record that `record_name` was updated to `address` at `at`
    fn record_update(&self, address: &str, record_name: &str, at: DateTime<Utc>);
}

/// Sink that discards every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record_address(&self, _address: &str, _record_name: &str) {}

    fn record_update(&self, _address: &str, _record_name: &str, _at: DateTime<Utc>) {}
}
