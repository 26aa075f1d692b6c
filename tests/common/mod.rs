// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use unbound_webhook::config::OpnsenseConfig;
use unbound_webhook::{webhook, DomainFilter, IngressClassMap, OpnsenseClient, UnboundProvider};
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "integration-key";
pub const API_SECRET: &str = "integration-secret";

pub const SEARCH_PATH: &str = "/api/unbound/settings/searchHostOverride";
pub const ADD_PATH: &str = "/api/unbound/settings/addHostOverride";
pub const DEL_PATH: &str = "/api/unbound/settings/delHostOverride";
pub const RECONFIGURE_PATH: &str = "/api/unbound/service/reconfigure";

/// Start a mock OPNsense API serving `rows` from `searchHostOverride`
///
/// Creates, deletes and reconfigures all succeed.
pub async fn start_opnsense(rows: Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(basic_auth(API_KEY, API_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": rows })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ADD_PATH))
        .and(basic_auth(API_KEY, API_SECRET))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": "saved", "uuid": "new"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RECONFIGURE_PATH))
        .and(basic_auth(API_KEY, API_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    server
}

/// Serve the webhook on an ephemeral port against `opnsense`
///
/// Returns the base URL of the webhook.
pub async fn start_webhook(
    opnsense: &MockServer,
    domain_filter: DomainFilter,
    ingress_classes: IngressClassMap,
) -> String {
    let client = OpnsenseClient::new(&OpnsenseConfig {
        host: opnsense.uri(),
        api_key: API_KEY.to_string(),
        api_secret: API_SECRET.to_string(),
        skip_tls_verify: false,
    })
    .expect("mock OPNsense URL should be valid");

    let provider = UnboundProvider::new(Arc::new(client), domain_filter, ingress_classes);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind an ephemeral port");
    let addr = listener.local_addr().expect("listener should have an address");

    tokio::spawn(webhook::serve(
        listener,
        webhook::router(Arc::new(provider)),
        std::future::pending(),
    ));

    format!("http://{addr}")
}
