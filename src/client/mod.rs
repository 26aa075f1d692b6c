// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Remote host-override store.
//!
//! [`HostOverrideClient`] is the capability set the provider consumes: list,
//! create and delete host overrides, then reconfigure Unbound so it serves the
//! pending changes. [`OpnsenseClient`] implements it over the OPNsense HTTP API.
//!
//! # Example
//!
//! ```rust,no_run
//! use unbound_webhook::client::{HostOverrideClient, OpnsenseClient};
//! use unbound_webhook::config::OpnsenseConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = OpnsenseClient::new(&OpnsenseConfig {
//!     host: "firewall.home.arpa".to_string(),
//!     api_key: "key".to_string(),
//!     api_secret: "secret".to_string(),
//!     skip_tls_verify: false,
//! })?;
//!
//! for host in client.list_host_overrides().await? {
//!     println!("{} -> {}", host.to_endpoint().dns_name, host.server);
//! }
//! # Ok(())
//! # }
//! ```

pub mod opnsense;

pub use opnsense::OpnsenseClient;

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::errors::ClientError;
use crate::host_override::HostOverride;

/// Operations on the resolver's host-override store.
///
/// Implementations perform one remote round trip per call and never retry.
/// Dropping a returned future cancels the in-flight request.
#[async_trait]
pub trait HostOverrideClient: Send + Sync {
    /// List every host override, in the store's order.
    async fn list_host_overrides(&self) -> Result<Vec<HostOverride>, ClientError>;

    /// Create a host override for `endpoint`, returning its uuid.
    async fn create_host_override(&self, endpoint: &Endpoint) -> Result<String, ClientError>;

    /// Delete the host override(s) storing `endpoint`.
    async fn delete_host_override(&self, endpoint: &Endpoint) -> Result<(), ClientError>;

    /// Apply pending store changes so the resolver serves them.
    async fn reconfigure(&self) -> Result<(), ClientError>;
}
