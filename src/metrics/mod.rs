//! Metrics module
//!
//! Prometheus collectors registered in the default registry and exposed
//! on `GET /metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "product_api_requests_total",
        "Total number of HTTP requests",
        &["route", "status"]
    ).expect("requests counter registers once");

    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "product_api_request_duration_seconds",
        "Request handling duration in seconds",
        &["route"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).expect("duration histogram registers once");

    // Auth metrics
    pub static ref AUTH_ATTEMPTS: CounterVec = register_counter_vec!(
        "product_api_auth_attempts_total",
        "Authentication attempts",
        &["method", "status"]  // method: "login" or "token"
    ).expect("auth counter registers once");

    pub static ref PRODUCT_OPERATIONS: CounterVec = register_counter_vec!(
        "product_api_products_total",
        "Successful product mutations",
        &["operation"]
    ).expect("product counter registers once");
}

/// Record a handled request
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[route, status.as_str()])
        .inc();
    REQUEST_DURATION
        .with_label_values(&[route])
        .observe(duration_secs);
}

/// Record authentication attempt
pub fn record_auth_attempt(method: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    AUTH_ATTEMPTS.with_label_values(&[method, status]).inc();
}

/// Record a product create/update/delete
pub fn record_product_operation(operation: &str) {
    PRODUCT_OPERATIONS.with_label_values(&[operation]).inc();
}

/// Render every registered metric in the Prometheus text format
pub fn gather_text() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
