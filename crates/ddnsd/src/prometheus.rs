//! Prometheus metrics for ddnsd
//!
//! Exposes:
//! - `ddns_build_info{version}` - Constant `1` labeled by the running version
//! - `ddns_start_time_seconds` - Process start time since the unix epoch
//! - `ddns_dns_a_record_info{ip_address,a_record}` - Constant `1` per inspected record
//! - `ddns_dns_a_record_update_time_seconds{ip_address,a_record}` - Time of the last update

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::{DateTime, Utc};
use ddns_core::MetricsSink;
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const BUILD_INFO: &str = "ddns_build_info";
const START_TIME: &str = "ddns_start_time_seconds";
const A_RECORD_INFO: &str = "ddns_dns_a_record_info";
const A_RECORD_UPDATE_TIME: &str = "ddns_dns_a_record_update_time_seconds";

/// Install the global Prometheus recorder
///
/// Must be called once, before any metric is recorded. The returned
/// handle renders the current values.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus metrics recorder")?;

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_gauge!(
        BUILD_INFO,
        "Metric with a constant '1' value labeled by the version of ddnsd."
    );
    describe_gauge!(
        START_TIME,
        "Start time of the process since unix epoch in seconds."
    );
    describe_gauge!(
        A_RECORD_INFO,
        "Metric with a constant '1' value showing the current A records and their addresses."
    );
    describe_gauge!(
        A_RECORD_UPDATE_TIME,
        "Time of the last update of an A record since unix epoch in seconds."
    );
}

/// Record the process-level gauges
pub fn record_startup(version: &str, started_at: DateTime<Utc>) {
    gauge!(BUILD_INFO, "version" => version.to_string()).set(1.0);
    gauge!(START_TIME).set(started_at.timestamp() as f64);
}

/// [`MetricsSink`] writing to the installed `metrics` recorder
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_address(&self, address: &str, record_name: &str) {
        gauge!(
            A_RECORD_INFO,
            "ip_address" => address.to_string(),
            "a_record" => record_name.to_string()
        )
        .set(1.0);
    }

    fn record_update(&self, address: &str, record_name: &str, at: DateTime<Utc>) {
        gauge!(
            A_RECORD_UPDATE_TIME,
            "ip_address" => address.to_string(),
            "a_record" => record_name.to_string()
        )
        .set(at.timestamp() as f64);
    }
}

/// Router serving `GET /metrics`
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(handle)
}

async fn get_metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
