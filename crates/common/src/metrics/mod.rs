//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all RawMat Portal metrics
pub const METRICS_PREFIX: &str = "rawmat";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Intake metrics
    describe_counter!(
        format!("{}_leads_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total leads accepted into the store"
    );

    describe_counter!(
        format!("{}_intake_rejections_total", METRICS_PREFIX),
        Unit::Count,
        "Total intake submissions rejected by validation"
    );

    // Admin metrics
    describe_counter!(
        format!("{}_admin_unlocks_total", METRICS_PREFIX),
        Unit::Count,
        "Total successful admin logins"
    );

    describe_counter!(
        format!("{}_admin_login_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Total rejected admin login attempts"
    );

    describe_counter!(
        format!("{}_exports_total", METRICS_PREFIX),
        Unit::Count,
        "Total lead CSV exports downloaded"
    );

    // Store metrics
    describe_histogram!(
        format!("{}_store_rewrite_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Lead store rewrite latency in seconds"
    );

    describe_gauge!(
        format!("{}_store_records", METRICS_PREFIX),
        Unit::Count,
        "Lead records in the store after the last rewrite"
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
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record an accepted intake submission
pub fn record_lead_submitted(category: &str) {
    counter!(
        format!("{}_leads_submitted_total", METRICS_PREFIX),
        "category" => category.to_string()
    )
    .increment(1);
}

/// Record an intake submission rejected by validation
pub fn record_intake_rejection(field: &str) {
    counter!(
        format!("{}_intake_rejections_total", METRICS_PREFIX),
        "field" => field.to_string()
    )
    .increment(1);
}

/// Record an admin login attempt
pub fn record_admin_login(success: bool) {
    if success {
        counter!(format!("{}_admin_unlocks_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(format!("{}_admin_login_failures_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a CSV export download
pub fn record_export(records: usize) {
    counter!(format!("{}_exports_total", METRICS_PREFIX)).increment(1);
    gauge!(format!("{}_store_records", METRICS_PREFIX)).set(records as f64);
}

/// Record a store rewrite
pub fn record_store_rewrite(duration_secs: f64, records: usize) {
    histogram!(format!("{}_store_rewrite_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    gauge!(format!("{}_store_records", METRICS_PREFIX)).set(records as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (150ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.150));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/admin");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_recording_helpers_run() {
        record_lead_submitted("Polymers");
        record_intake_rejection("company_name");
        record_admin_login(true);
        record_admin_login(false);
        record_export(3);
        record_store_rewrite(0.002, 4);
    }
}
