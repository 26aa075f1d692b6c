// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the webhook HTTP surface, served on an ephemeral port.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    use crate::client::HostOverrideClient;
    use crate::constants::{INGRESS_CLASS_LABEL, WEBHOOK_MEDIA_TYPE};
    use crate::domain_filter::DomainFilter;
    use crate::endpoint::Endpoint;
    use crate::errors::ClientError;
    use crate::host_override::{HostOverride, NewHostOverride};
    use crate::ingress_class::IngressClassMap;
    use crate::provider::UnboundProvider;
    use crate::webhook::{health_router, router, serve};

    /// Host-override store kept in memory.
    #[derive(Default)]
    struct MemoryClient {
        rows: Mutex<Vec<HostOverride>>,
        reconfigures: Mutex<usize>,
        fail_list: bool,
        fail_reconfigure: bool,
    }

    impl MemoryClient {
        fn with_rows(rows: Vec<HostOverride>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl HostOverrideClient for MemoryClient {
        async fn list_host_overrides(&self) -> Result<Vec<HostOverride>, ClientError> {
            if self.fail_list {
                return Err(ClientError::Status {
                    url: "https://fw/api/unbound/settings/searchHostOverride".to_string(),
                    status: StatusCode::UNAUTHORIZED,
                    body: "Authentication Failed".to_string(),
                });
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create_host_override(&self, endpoint: &Endpoint) -> Result<String, ClientError> {
            let host = NewHostOverride::from_endpoint(endpoint)?;
            let mut rows = self.rows.lock().unwrap();
            let uuid = format!("uuid-{}", rows.len());
            rows.push(HostOverride {
                uuid: uuid.clone(),
                enabled: host.enabled,
                hostname: host.hostname,
                domain: host.domain,
                rr: host.rr,
                server: host.server,
                description: host.description,
            });
            Ok(uuid)
        }

        async fn delete_host_override(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
            self.rows
                .lock()
                .unwrap()
                .retain(|row| !row.matches(endpoint));
            Ok(())
        }

        async fn reconfigure(&self) -> Result<(), ClientError> {
            if self.fail_reconfigure {
                return Err(ClientError::Rejected {
                    operation: "reconfigure",
                    detail: "status=failed".to_string(),
                });
            }
            *self.reconfigures.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn row(hostname: &str, domain: &str, rr: &str, server: &str) -> HostOverride {
        HostOverride {
            uuid: format!("{hostname}-{domain}"),
            enabled: "1".to_string(),
            hostname: hostname.to_string(),
            domain: domain.to_string(),
            rr: rr.to_string(),
            server: server.to_string(),
            description: String::new(),
        }
    }

    fn nginx_classes() -> IngressClassMap {
        [("nginx", "10.0.0.5")].into_iter().collect()
    }

    async fn spawn(client: Arc<MemoryClient>, filter: DomainFilter) -> String {
        let provider = UnboundProvider::new(client, filter, nginx_classes());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(
            listener,
            router(Arc::new(provider)),
            std::future::pending(),
        ));
        format!("http://{addr}")
    }

    fn content_type(response: &reqwest::Response) -> &str {
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    // =====================================================
    // Negotiation
    // =====================================================

    #[tokio::test]
    async fn test_negotiate_returns_domain_filter() {
        let filter = DomainFilter::from_csv("example.com", "lab.example.com");
        let base = spawn(Arc::new(MemoryClient::default()), filter).await;

        let response = reqwest::get(format!("{base}/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), WEBHOOK_MEDIA_TYPE);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({"include": ["example.com"], "exclude": ["lab.example.com"]})
        );
    }

    #[tokio::test]
    async fn test_negotiate_without_filter_is_empty_object() {
        let base = spawn(Arc::new(MemoryClient::default()), DomainFilter::default()).await;

        let body: Value = reqwest::get(format!("{base}/"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body, json!({}));
    }

    // =====================================================
    // Records
    // =====================================================

    #[tokio::test]
    async fn test_get_records_filters_names() {
        let client = Arc::new(MemoryClient::with_rows(vec![
            row("www", "example.com", "A (IPv4 address)", "192.0.2.10"),
            row("nas", "home.arpa", "A (IPv4 address)", "192.0.2.20"),
        ]));
        let base = spawn(client, DomainFilter::from_csv("example.com", "")).await;

        let response = reqwest::get(format!("{base}/records")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), WEBHOOK_MEDIA_TYPE);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!([{"dnsName": "www.example.com", "targets": ["192.0.2.10"], "recordType": "A"}])
        );
    }

    #[tokio::test]
    async fn test_get_records_failure_is_500_with_cause() {
        let client = Arc::new(MemoryClient {
            fail_list: true,
            ..MemoryClient::default()
        });
        let base = spawn(client, DomainFilter::default()).await;

        let response = reqwest::get(format!("{base}/records")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().await.unwrap().contains("Authentication Failed"));
    }

    #[tokio::test]
    async fn test_post_records_applies_changes() {
        let client = Arc::new(MemoryClient::with_rows(vec![row(
            "old",
            "example.com",
            "A",
            "192.0.2.1",
        )]));
        let base = spawn(Arc::clone(&client), DomainFilter::default()).await;

        let changes = json!({
            "Create": [{
                "dnsName": "app.example.com",
                "targets": ["ingress.example.com"],
                "recordType": "CNAME",
                "labels": {INGRESS_CLASS_LABEL: "nginx"}
            }],
            "UpdateOld": null,
            "UpdateNew": null,
            "Delete": [{"dnsName": "old.example.com", "targets": ["192.0.2.1"], "recordType": "A"}]
        });

        let response = reqwest::Client::new()
            .post(format!("{base}/records"))
            .header(CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)
            .body(changes.to_string())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let rows = client.rows.lock().unwrap().clone();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hostname, "app");
        assert_eq!(rows[0].rr, "A");
        assert_eq!(rows[0].server, "10.0.0.5");
        assert_eq!(*client.reconfigures.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_post_records_reconfigure_failure_is_500() {
        let client = Arc::new(MemoryClient {
            fail_reconfigure: true,
            ..MemoryClient::default()
        });
        let base = spawn(client, DomainFilter::default()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/records"))
            .header(CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)
            .body("{}")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text().await.unwrap();
        assert!(body.contains("reconfigure failed"));
        assert!(body.contains("status=failed"));
    }

    #[tokio::test]
    async fn test_post_records_multi_target_create_blocks_reconfigure() {
        let client = Arc::new(MemoryClient::with_rows(vec![row(
            "old",
            "example.com",
            "A",
            "192.0.2.1",
        )]));
        let base = spawn(Arc::clone(&client), DomainFilter::default()).await;

        let changes = json!({
            "Delete": [{"dnsName": "old.example.com", "targets": ["192.0.2.1"], "recordType": "A"}],
            "Create": [{
                "dnsName": "multi.example.com",
                "targets": ["192.0.2.10", "192.0.2.11"],
                "recordType": "A"
            }]
        });

        let response = reqwest::Client::new()
            .post(format!("{base}/records"))
            .header(CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)
            .body(changes.to_string())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().await.unwrap().contains("has 2 targets"));
        // The delete stays applied but Unbound was never reconfigured
        assert!(client.rows.lock().unwrap().is_empty());
        assert_eq!(*client.reconfigures.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_post_records_malformed_body_is_client_error() {
        let client = Arc::new(MemoryClient::default());
        let base = spawn(Arc::clone(&client), DomainFilter::default()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/records"))
            .header(CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)
            .body("{\"Create\": 42}")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(*client.reconfigures.lock().unwrap(), 0);
    }

    // =====================================================
    // Adjust endpoints
    // =====================================================

    #[tokio::test]
    async fn test_adjust_endpoints_rewrites_mapped_cnames() {
        let base = spawn(Arc::new(MemoryClient::default()), DomainFilter::default()).await;

        let endpoints = json!([
            {"dnsName": "app.example.com", "targets": ["lb.example.com"], "recordType": "CNAME",
             "labels": {INGRESS_CLASS_LABEL: "nginx"}},
            {"dnsName": "txt.example.com", "targets": ["\"v=spf1 -all\""], "recordType": "TXT"}
        ]);

        let response = reqwest::Client::new()
            .post(format!("{base}/adjustendpoints"))
            .header(CONTENT_TYPE, WEBHOOK_MEDIA_TYPE)
            .body(endpoints.to_string())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), WEBHOOK_MEDIA_TYPE);
        let adjusted: Vec<Endpoint> = response.json().await.unwrap();
        assert_eq!(adjusted.len(), 2);
        assert_eq!(adjusted[0].record_type.as_str(), "A");
        assert_eq!(adjusted[0].targets, vec!["10.0.0.5".to_string()]);
        assert_eq!(adjusted[1].record_type.as_str(), "TXT");
    }

    // =====================================================
    // Health
    // =====================================================

    #[tokio::test]
    async fn test_health_and_metrics() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, health_router(), std::future::pending()));

        let health = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(health.text().await.unwrap(), "ok");

        crate::metrics::record_managed_records(1);
        let metrics = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
        assert_eq!(metrics.status(), StatusCode::OK);
        assert!(metrics
            .text()
            .await
            .unwrap()
            .contains("unbound_webhook_managed_records"));
    }
}
