//! Metrics and observability utilities
//!
//! Prometheus metrics with latency histograms and a shared naming prefix.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarDemon metrics
pub const METRICS_PREFIX: &str = "scholardemon";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Name of a metric with the shared prefix applied
pub fn metric_name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        metric_name("requests_total"),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        metric_name("request_duration_seconds"),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        metric_name("search_queries_total"),
        Unit::Count,
        "Total number of paper and author searches"
    );

    describe_histogram!(
        metric_name("search_duration_seconds"),
        Unit::Seconds,
        "Search query latency in seconds"
    );

    describe_gauge!(
        metric_name("search_results_count"),
        Unit::Count,
        "Total matches reported by the last search"
    );

    describe_counter!(
        metric_name("search_history_failures_total"),
        Unit::Count,
        "Search history rows that could not be recorded"
    );

    describe_counter!(
        metric_name("users_registered_total"),
        Unit::Count,
        "Accounts created through registration"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            metric_name("requests_total"),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            metric_name("request_duration_seconds"),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a completed search. `kind` is "papers" or "authors".
pub fn record_search(duration_secs: f64, kind: &str, total: u64) {
    counter!(metric_name("search_queries_total"), "kind" => kind.to_string()).increment(1);

    histogram!(metric_name("search_duration_seconds"), "kind" => kind.to_string())
        .record(duration_secs);

    gauge!(metric_name("search_results_count"), "kind" => kind.to_string()).set(total as f64);
}

/// Record a search-history write that was dropped
pub fn record_search_history_failure() {
    counter!(metric_name("search_history_failures_total")).increment(1);
}

/// Record a new account
pub fn record_registration(role: &str) {
    counter!(metric_name("users_registered_total"), "role" => role.to_string()).increment(1);
}
