// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

/// `entry_point` label for the `updateOrderStatus` callable.
pub const CALLABLE: &str = "callable";
/// `entry_point` label for the `orderStatusRequests` trigger.
pub const TRIGGER: &str = "trigger";

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Status updates per entry point and outcome
// - Failure reasons per entry point
// - Handler latency
// - Redelivered queued requests that were skipped
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub status_updates: IntCounterVec,
    pub status_update_failures: IntCounterVec,
    pub status_update_duration: HistogramVec,
    pub queued_requests_skipped: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let status_updates = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Order status update attempts by outcome"),
            &["entry_point", "outcome"],
        )?;
        registry.register(Box::new(status_updates.clone()))?;

        let status_update_failures = IntCounterVec::new(
            Opts::new("order_status_update_failures_total", "Rejected order status updates by reason"),
            &["entry_point", "reason"],
        )?;
        registry.register(Box::new(status_update_failures.clone()))?;

        let status_update_duration = HistogramVec::new(
            HistogramOpts::new("order_status_update_duration_seconds", "Order status update handling duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["entry_point"],
        )?;
        registry.register(Box::new(status_update_duration.clone()))?;

        let queued_requests_skipped = IntCounter::new(
            "queued_requests_skipped_total",
            "Redelivered status requests that were already processed",
        )?;
        registry.register(Box::new(queued_requests_skipped.clone()))?;

        Ok(Self {
            registry,
            status_updates,
            status_update_failures,
            status_update_duration,
            queued_requests_skipped,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_outcome(&self, entry_point: &str, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.status_updates.with_label_values(&[entry_point, outcome]).inc();
        self.status_update_duration.with_label_values(&[entry_point]).observe(duration_secs);
    }

    pub fn record_failure_reason(&self, entry_point: &str, reason: &str) {
        self.status_update_failures.with_label_values(&[entry_point, reason]).inc();
    }

    pub fn record_skipped(&self) {
        self.queued_requests_skipped.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_skipped();
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record_outcome(CALLABLE, true, 0.02);
        metrics.record_outcome(TRIGGER, false, 0.01);

        assert_eq!(metrics.status_updates.with_label_values(&[CALLABLE, "success"]).get(), 1);
        assert_eq!(metrics.status_updates.with_label_values(&[TRIGGER, "failure"]).get(), 1);
        assert_eq!(
            metrics
                .status_update_duration
                .with_label_values(&[CALLABLE])
                .get_sample_count(),
            1
        );
    }

    #[test]
    fn test_record_failure_reason() {
        let metrics = Metrics::new().unwrap();
        metrics.record_failure_reason(TRIGGER, "invalid_transition");
        metrics.record_failure_reason(TRIGGER, "invalid_transition");

        assert_eq!(
            metrics
                .status_update_failures
                .with_label_values(&[TRIGGER, "invalid_transition"])
                .get(),
            2
        );
    }
}
