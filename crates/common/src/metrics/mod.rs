//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all MangaForge metrics
pub const METRICS_PREFIX: &str = "mangaforge";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, // 1ms
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms - P50 target
    0.075, // 75ms
    0.100, // 100ms
    0.150, // 150ms - P99 target
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
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

    // Chapter upload metrics
    describe_counter!(
        format!("{}_chapters_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total chapters uploaded"
    );

    describe_counter!(
        format!("{}_chapter_images_stored_total", METRICS_PREFIX),
        Unit::Count,
        "Total chapter page images stored"
    );

    describe_histogram!(
        format!("{}_chapter_upload_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Chapter upload latency in seconds"
    );

    // Moderation metrics
    describe_counter!(
        format!("{}_chapter_moderation_total", METRICS_PREFIX),
        Unit::Count,
        "Chapter moderation decisions (approve/reject)"
    );

    // Catalog metrics
    describe_counter!(
        format!("{}_manga_views_total", METRICS_PREFIX),
        Unit::Count,
        "Manga detail views"
    );

    describe_counter!(
        format!("{}_follows_toggled_total", METRICS_PREFIX),
        Unit::Count,
        "Follow/unfollow toggles"
    );

    // Database metrics
    describe_gauge!(
        format!("{}_db_connections_active", METRICS_PREFIX),
        Unit::Count,
        "Active database connections"
    );

    describe_histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Database query latency in seconds"
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

/// Helper to record a chapter upload
pub fn record_chapter_upload(duration_secs: f64, images_stored: usize) {
    counter!(format!("{}_chapters_uploaded_total", METRICS_PREFIX)).increment(1);

    counter!(format!("{}_chapter_images_stored_total", METRICS_PREFIX))
        .increment(images_stored as u64);

    histogram!(format!("{}_chapter_upload_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record a moderation decision
pub fn record_moderation(action: &str) {
    counter!(
        format!("{}_chapter_moderation_total", METRICS_PREFIX),
        "action" => action.to_string()
    )
    .increment(1);
}

/// Helper to record a manga detail view
pub fn record_manga_view() {
    counter!(format!("{}_manga_views_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record a follow toggle
pub fn record_follow_toggle(following: bool) {
    counter!(
        format!("{}_follows_toggled_total", METRICS_PREFIX),
        "state" => if following { "followed" } else { "unfollowed" }.to_string()
    )
    .increment(1);
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
        let metrics = RequestMetrics::start("GET", "/v1/manga");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
