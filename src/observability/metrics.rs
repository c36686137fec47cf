//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency by method
//! - `gateway_tenant_requests_total` (counter): resolved requests by tenant
//! - `gateway_auth_failures_total` (counter): rejected credentials by reason
//! - `gateway_upstream_errors_total` (counter): relay failures by tenant
//!
//! # Design Decisions
//! - Tenant labels are only recorded for configured tenants, so arbitrary
//!   hosts or paths cannot grow label cardinality
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_tenant_request(tenant: &str) {
    counter!("gateway_tenant_requests_total", "tenant" => tenant.to_string()).increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    counter!("gateway_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_upstream_error(tenant: &str) {
    counter!("gateway_upstream_errors_total", "tenant" => tenant.to_string()).increment(1);
}
