// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Unbound webhook.
//!
//! All metrics use the namespace prefix `unbound_webhook_`.
//!
//! # Metrics Categories
//!
//! - **Webhook Metrics** - Requests served to external-dns by route and status
//! - **Apply Metrics** - Change-set outcomes and duration
//! - **Store Metrics** - Host-override mutations and the size of the managed set
//!
//! # Example
//!
//! ```rust,no_run
//! use unbound_webhook::metrics::{gather_metrics, record_webhook_request};
//!
//! record_webhook_request("/records", 200);
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all webhook metrics
const METRICS_NAMESPACE: &str = "unbound_webhook";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Webhook Metrics
// ============================================================================

/// Total webhook requests
///
/// Labels:
/// - `route`: Request path (e.g., `/records`)
/// - `status`: HTTP status code returned
pub static WEBHOOK_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_webhook_requests_total"),
        "Total number of webhook requests by route and status",
    );
    let counter = CounterVec::new(opts, &["route", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Apply Metrics
// ============================================================================

/// Duration of change-set applications in seconds
///
/// Labels:
/// - `outcome`: `success`, `delete_error`, `create_error` or `reconfigure_error`
pub static APPLY_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_apply_duration_seconds"),
        "Duration of change-set applications in seconds by outcome",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Store Metrics
// ============================================================================

/// Host-override mutations performed against Unbound
///
/// Only mutations the store accepted are counted; a change set that fails
/// part-way contributes just the calls that succeeded before the failure.
///
/// Labels:
/// - `operation`: `create` or `delete`
/// - `record_type`: Record type sent to the store (e.g., `A`, `CNAME`)
pub static HOST_OVERRIDE_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_host_override_changes_total"),
        "Total number of host-override mutations performed by operation and record type",
    );
    let counter = CounterVec::new(opts, &["operation", "record_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of records returned by the last successful listing
pub static MANAGED_RECORDS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_managed_records"),
        "Number of host overrides matching the domain filter at the last listing",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a served webhook request
///
/// # Arguments
/// * `route` - Request path
/// * `status` - HTTP status code returned
pub fn record_webhook_request(route: &str, status: u16) {
    let status = status.to_string();
    WEBHOOK_REQUESTS_TOTAL
        .with_label_values(&[route, status.as_str()])
        .inc();
}

/// Record the outcome of applying a change set
///
/// # Arguments
/// * `outcome` - Outcome label
/// * `duration` - Time spent applying
pub fn record_apply(outcome: &str, duration: Duration) {
    APPLY_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Record one host-override mutation accepted by the store
///
/// # Arguments
/// * `operation` - `create` or `delete`
/// * `record_type` - Record type of the mutated host override
pub fn record_host_override_change(operation: &str, record_type: &str) {
    HOST_OVERRIDE_CHANGES_TOTAL
        .with_label_values(&[operation, record_type])
        .inc();
}

/// Record the size of the managed record set
#[allow(clippy::cast_precision_loss)]
pub fn record_managed_records(count: usize) {
    MANAGED_RECORDS.set(count as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
