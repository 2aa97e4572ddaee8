use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: availability queries served (single and bulk sub-requests).
pub const AVAILABILITY_QUERIES_TOTAL: &str = "huddle_availability_queries_total";

/// Histogram: availability query latency in seconds.
pub const AVAILABILITY_QUERY_DURATION_SECONDS: &str = "huddle_availability_query_duration_seconds";

/// Counter: candidate slots emitted by the generator.
pub const SLOTS_EMITTED_TOTAL: &str = "huddle_slots_emitted_total";

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "huddle_bookings_created_total";

/// Counter: bookings updated.
pub const BOOKINGS_UPDATED_TOTAL: &str = "huddle_bookings_updated_total";

/// Counter: bookings deleted.
pub const BOOKINGS_DELETED_TOTAL: &str = "huddle_bookings_deleted_total";

/// Counter: create/update requests rejected by the conflict detector.
pub const BOOKING_CONFLICTS_TOTAL: &str = "huddle_booking_conflicts_total";

// ── Provider health ─────────────────────────────────────────────

/// Counter: calendar provider calls that failed on read/write paths.
pub const PROVIDER_FAILURES_TOTAL: &str = "huddle_provider_failures_total";

/// Counter: best-effort event deletions that failed and were swallowed.
pub const CALENDAR_CLEANUP_FAILURES_TOTAL: &str = "huddle_calendar_cleanup_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
