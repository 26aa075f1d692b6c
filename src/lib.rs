// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # unbound-webhook - external-dns provider for OPNsense Unbound
//!
//! An external-dns webhook provider that keeps Kubernetes-derived DNS records in
//! sync with the host overrides of an OPNsense Unbound resolver.
//!
//! ## Overview
//!
//! external-dns computes the records a cluster should publish and talks to this
//! webhook over HTTP. The webhook:
//!
//! - Lists Unbound host overrides as external-dns endpoints
//! - Applies change sets: deletions first, then creations, then one reconfigure
//! - Restricts itself to the configured domain filter
//! - Rewrites CNAMEs of pinned ingress classes into A records
//!
//! ## Modules
//!
//! - [`endpoint`] - external-dns endpoint and change-set types
//! - [`host_override`] - Unbound host-override rows and translation
//! - [`client`] - OPNsense API client
//! - [`provider`] - Listing and change application
//! - [`webhook`] - external-dns HTTP surface
//! - [`config`] - Command-line and environment configuration
//!
//! ## Example
//!
//! ```rust
//! use unbound_webhook::{rewrite::cname_to_a, DomainFilter, Endpoint, IngressClassMap, RecordType};
//!
//! let filter = DomainFilter::from_csv("example.com", "");
//! let classes = IngressClassMap::parse("nginx=10.0.0.5");
//!
//! let endpoint = Endpoint::new("app.example.com", "CNAME", vec!["lb.example.com".into()])
//!     .with_label("kubernetes.io/ingress.class", "nginx");
//!
//! assert!(filter.match_name(&endpoint.dns_name));
//! assert_eq!(cname_to_a(&endpoint, &classes).record_type, RecordType::A);
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod domain_filter;
pub mod endpoint;
pub mod errors;
pub mod fqdn;
pub mod host_override;
pub mod ingress_class;
pub mod metrics;
pub mod provider;
pub mod rewrite;
pub mod webhook;

pub use client::{HostOverrideClient, OpnsenseClient};
pub use config::Config;
pub use domain_filter::DomainFilter;
pub use endpoint::{Changes, Endpoint, RecordType};
pub use errors::{ApplyError, ClientError, RecordError};
pub use ingress_class::IngressClassMap;
pub use provider::UnboundProvider;
