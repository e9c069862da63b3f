use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all metrics of this server
const PREFIX: &str = "vinyl";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Sync Metrics
    pub static ref SYNC_RUNS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_sync_runs_total"), "Collection sync runs by result"),
        &["result"]
    ).expect("Failed to create sync_runs_total metric");

    pub static ref SYNC_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_sync_duration_seconds"),
            "Collection sync duration in seconds"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0])
    ).expect("Failed to create sync_duration_seconds metric");

    pub static ref SYNC_ALBUMS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_sync_albums_total"), "Albums handled by sync, by outcome"),
        &["outcome"]
    ).expect("Failed to create sync_albums_total metric");

    pub static ref MASTER_DATA_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_master_data_failures_total"),
            "Master data fetches that failed, by error kind"
        ),
        &["kind"]
    ).expect("Failed to create master_data_failures_total metric");

    pub static ref CACHED_ALBUMS: Gauge = Gauge::new(
        format!("{PREFIX}_cached_albums"),
        "Number of albums in the local cache after the last sync"
    ).expect("Failed to create cached_albums metric");

    // Database Metrics
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_db_query_duration_seconds"),
            "Database query duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation"]
    ).expect("Failed to create db_query_duration_seconds metric");

    pub static ref DB_CONNECTION_ERRORS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_db_connection_errors_total"),
        "Total database connection errors"
    ).expect("Failed to create db_connection_errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered is fine (tests call this repeatedly)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(SYNC_RUNS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SYNC_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(SYNC_ALBUMS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MASTER_DATA_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CACHED_ALBUMS.clone()));
    let _ = REGISTRY.register(Box::new(DB_QUERY_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DB_CONNECTION_ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Label for a request path. Only the known routes get their own label so
/// arbitrary client paths cannot grow the series set.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path.trim_end_matches('/') {
        "" => "/",
        "/api/albums" => "/api/albums",
        "/api/revalidate" => "/api/revalidate",
        "/api/collection" => "/api/collection",
        "/metrics" => "/metrics",
        p if p.starts_with("/api/") || p == "/api" => "other",
        _ => "static",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let path = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a finished sync run. `result` is "success" or "failure".
pub fn record_sync_run(result: &str, duration: Duration) {
    SYNC_RUNS_TOTAL.with_label_values(&[result]).inc();
    SYNC_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record the cache mutations of a successful sync
pub fn record_sync_changes(inserted: usize, deleted: usize, skipped: usize, total: usize) {
    SYNC_ALBUMS_TOTAL
        .with_label_values(&["inserted"])
        .inc_by(inserted as f64);
    SYNC_ALBUMS_TOTAL
        .with_label_values(&["deleted"])
        .inc_by(deleted as f64);
    SYNC_ALBUMS_TOTAL
        .with_label_values(&["skipped"])
        .inc_by(skipped as f64);
    set_cached_albums(total);
}

/// Set the cached albums gauge
pub fn set_cached_albums(count: usize) {
    CACHED_ALBUMS.set(count as f64);
}

/// Record a failed master data fetch
pub fn record_master_data_failure(kind: &str) {
    MASTER_DATA_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

/// Record a database query
pub fn record_db_query(operation: &str, duration: Duration) {
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a database connection error
pub fn record_db_connection_error() {
    DB_CONNECTION_ERRORS_TOTAL.inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
