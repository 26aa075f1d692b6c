// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! OPNsense Unbound HTTP API client.
//!
//! Authenticates with an API key/secret pair over HTTP basic auth. Every call
//! is a single request: there is no retry or backoff at this layer.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};
use url::Url;

use super::HostOverrideClient;
use crate::config::OpnsenseConfig;
use crate::constants::{
    API_ADD_HOST_OVERRIDE, API_DEL_HOST_OVERRIDE, API_RECONFIGURE, API_SEARCH_HOST_OVERRIDE,
    RESULT_DELETED, RESULT_SAVED, STATUS_OK,
};
use crate::endpoint::Endpoint;
use crate::errors::ClientError;
use crate::fqdn::embellish_type;
use crate::host_override::{HostOverride, NewHostOverride};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    rows: Vec<HostOverride>,
}

/// Reply to `addHostOverride` and `delHostOverride`.
#[derive(Debug, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    validations: Option<serde_json::Value>,
}

impl MutationResponse {
    fn detail(&self) -> String {
        match &self.validations {
            Some(validations) => format!("result={} validations={validations}", self.result),
            None => format!("result={}", self.result),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReconfigureResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Serialize)]
struct AddHostOverrideRequest<'a> {
    host: &'a NewHostOverride,
}

/// Build the API base URL from the configured host.
///
/// Converts "firewall.home.arpa" or "10.0.0.1:8443" to `<https://firewall.home.arpa/>`
/// or `<https://10.0.0.1:8443/>`. An explicit scheme is kept. The trailing slash
/// lets API paths be joined onto the base.
pub(crate) fn build_api_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/")
    } else {
        format!("https://{host}/")
    }
}

/// Client for the OPNsense Unbound host-override API.
#[derive(Clone)]
pub struct OpnsenseClient {
    http: HttpClient,
    base_url: Url,
    api_key: String,
    api_secret: String,
}

impl fmt::Debug for OpnsenseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpnsenseClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl OpnsenseClient {
    /// Create a client for the configured firewall.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not form a valid URL or the HTTP client
    /// cannot be built (for example, TLS backend initialization fails).
    pub fn new(config: &OpnsenseConfig) -> Result<Self, ClientError> {
        let base = build_api_url(&config.host);
        let base_url = Url::parse(&base).map_err(|source| ClientError::InvalidUrl {
            url: base.clone(),
            source,
        })?;

        if config.skip_tls_verify {
            warn!(host = %base_url, "TLS certificate verification disabled for OPNsense API");
        }

        let http = HttpClient::builder()
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()
            .map_err(|source| ClientError::Transport {
                url: base.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// The base URL all API paths are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one authenticated request and decode the JSON reply.
    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + fmt::Debug + Sync,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| ClientError::InvalidUrl {
                url: path.to_string(),
                source,
            })?;

        debug!(
            method = %method,
            url = %url,
            body = ?body,
            "HTTP API request to OPNsense"
        );

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .basic_auth(&self.api_key, Some(&self.api_secret));
        if let Some(body_data) = body {
            request = request.json(body_data);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "HTTP API request failed"
            );
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
                body: text,
            });
        }

        debug!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "HTTP API request successful"
        );

        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn delete_by_uuid(&self, uuid: &str) -> Result<(), ClientError> {
        let path = format!("{API_DEL_HOST_OVERRIDE}/{uuid}");
        let response: MutationResponse = self.request(Method::POST, &path, None::<&()>).await?;

        if response.result != RESULT_DELETED {
            return Err(ClientError::Rejected {
                operation: "delHostOverride",
                detail: response.detail(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl HostOverrideClient for OpnsenseClient {
    async fn list_host_overrides(&self) -> Result<Vec<HostOverride>, ClientError> {
        let response: SearchResponse = self
            .request(Method::GET, API_SEARCH_HOST_OVERRIDE, None::<&()>)
            .await?;
        Ok(response.rows)
    }

    async fn create_host_override(&self, endpoint: &Endpoint) -> Result<String, ClientError> {
        let host = NewHostOverride::from_endpoint(endpoint)?;
        let request = AddHostOverrideRequest { host: &host };

        let response: MutationResponse = self
            .request(Method::POST, API_ADD_HOST_OVERRIDE, Some(&request))
            .await?;

        match response.uuid {
            Some(ref uuid) if response.result == RESULT_SAVED => {
                info!(
                    "Created host override {} {} -> {} ({uuid})",
                    endpoint.dns_name,
                    embellish_type(&host.rr),
                    host.server
                );
                Ok(uuid.clone())
            }
            _ => Err(ClientError::Rejected {
                operation: "addHostOverride",
                detail: response.detail(),
            }),
        }
    }

    async fn delete_host_override(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        let rows = self.list_host_overrides().await?;
        let matching: Vec<&HostOverride> = rows.iter().filter(|row| row.matches(endpoint)).collect();

        if matching.is_empty() {
            warn!(
                "No host override found for {} {}; nothing to delete",
                endpoint.dns_name,
                embellish_type(endpoint.record_type.as_str())
            );
            return Ok(());
        }

        for row in matching {
            self.delete_by_uuid(&row.uuid).await?;
            info!(
                "Deleted host override {} {} -> {} ({})",
                endpoint.dns_name, row.rr, row.server, row.uuid
            );
        }

        Ok(())
    }

    async fn reconfigure(&self) -> Result<(), ClientError> {
        let response: ReconfigureResponse = self
            .request(Method::POST, API_RECONFIGURE, None::<&()>)
            .await?;

        if !response.status.eq_ignore_ascii_case(STATUS_OK) {
            return Err(ClientError::Rejected {
                operation: "reconfigure",
                detail: format!("status={}", response.status),
            });
        }

        info!("Unbound reconfigured");
        Ok(())
    }
}

#[cfg(test)]
#[path = "opnsense_tests.rs"]
mod opnsense_tests;
