// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface for external-dns.
//!
//! [`router`] serves the webhook provider protocol on top of an
//! [`UnboundProvider`]:
//!
//! | Method | Path               | Response                                  |
//! |--------|--------------------|-------------------------------------------|
//! | `GET`  | `/`                | domain filter                             |
//! | `GET`  | `/records`         | current endpoints                         |
//! | `POST` | `/records`         | `204 No Content` once changes are applied |
//! | `POST` | `/adjustendpoints` | endpoints as they will be stored          |
//!
//! Successful JSON responses carry the versioned webhook media type. Remote
//! failures become `500` with the error chain as a plain-text body, which
//! external-dns logs before retrying on its next cycle.
//!
//! [`health_router`] is served on a separate listener for probes and scraping.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::constants::{HEALTH_PATH, METRICS_PATH, WEBHOOK_MEDIA_TYPE};
use crate::endpoint::{Changes, Endpoint};
use crate::errors::ApplyError;
use crate::metrics;
use crate::provider::UnboundProvider;

const ROUTE_NEGOTIATE: &str = "/";
const ROUTE_RECORDS: &str = "/records";
const ROUTE_ADJUST_ENDPOINTS: &str = "/adjustendpoints";

/// Build the external-dns webhook router.
pub fn router(provider: Arc<UnboundProvider>) -> Router {
    Router::new()
        .route(ROUTE_NEGOTIATE, get(negotiate_handler))
        .route(
            ROUTE_RECORDS,
            get(records_handler).post(apply_changes_handler),
        )
        .route(ROUTE_ADJUST_ENDPOINTS, post(adjust_endpoints_handler))
        .with_state(provider)
}

/// Build the health and metrics router.
pub fn health_router() -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .route(METRICS_PATH, get(metrics_handler))
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish once shutdown starts.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {addr}");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

// ============================================================================
// Webhook handlers
// ============================================================================

async fn negotiate_handler(State(provider): State<Arc<UnboundProvider>>) -> Response {
    debug!("negotiate: domain filter {:?}", provider.domain_filter());
    respond(ROUTE_NEGOTIATE, webhook_json(provider.domain_filter()))
}

async fn records_handler(State(provider): State<Arc<UnboundProvider>>) -> Response {
    let response = match provider.records().await {
        Ok(endpoints) => {
            metrics::record_managed_records(endpoints.len());
            webhook_json(&endpoints)
        }
        Err(e) => {
            error!("Failed to list records: {e}");
            internal_error(e)
        }
    };

    respond(ROUTE_RECORDS, response)
}

async fn apply_changes_handler(
    State(provider): State<Arc<UnboundProvider>>,
    Json(changes): Json<Changes>,
) -> Response {
    info!(
        create = changes.create.len(),
        update_old = changes.update_old.len(),
        update_new = changes.update_new.len(),
        delete = changes.delete.len(),
        "Applying changes"
    );

    let start = Instant::now();
    let result = provider.apply_changes(&changes).await;
    metrics::record_apply(apply_outcome(&result), start.elapsed());

    let response = match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to apply changes: {e}: {}", e.client_error());
            internal_error(e)
        }
    };

    respond(ROUTE_RECORDS, response)
}

async fn adjust_endpoints_handler(
    State(provider): State<Arc<UnboundProvider>>,
    Json(endpoints): Json<Vec<Endpoint>>,
) -> Response {
    let adjusted = provider.adjust_endpoints(endpoints);
    respond(ROUTE_ADJUST_ENDPOINTS, webhook_json(&adjusted))
}

// ============================================================================
// Health handlers
// ============================================================================

async fn health_handler() -> &'static str {
    "ok"
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn respond(route: &str, response: Response) -> Response {
    metrics::record_webhook_request(route, response.status().as_u16());
    response
}

fn webhook_json<T: Serialize + ?Sized>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => ([(header::CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)], body).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(err: impl Into<anyhow::Error>) -> Response {
    let err: anyhow::Error = err.into();
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")).into_response()
}

fn apply_outcome(result: &Result<(), ApplyError>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(ApplyError::Delete { .. }) => "delete_error",
        Err(ApplyError::Create { .. }) => "create_error",
        Err(ApplyError::Reconfigure { .. }) => "reconfigure_error",
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod webhook_tests;
