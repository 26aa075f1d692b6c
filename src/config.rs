// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every setting can be passed as a flag or through the environment variable
//! named next to it, which is how the webhook is usually configured when it
//! runs as an external-dns sidecar.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::fmt;
use std::net::SocketAddr;

use crate::constants::{DEFAULT_HEALTH_ADDR, DEFAULT_WEBHOOK_ADDR};
use crate::domain_filter::DomainFilter;
use crate::ingress_class::IngressClassMap;

/// Webhook configuration.
#[derive(Parser, Clone)]
#[command(name = "unbound-webhook", version, about, long_about = None)]
pub struct Config {
    /// OPNsense host, with optional scheme and port (https is assumed)
    #[arg(long, env = "OPNSENSE_HOST")]
    pub opnsense_host: String,

    /// OPNsense API key
    #[arg(long, env = "OPNSENSE_API_KEY", hide_env_values = true)]
    pub opnsense_api_key: String,

    /// OPNsense API secret
    #[arg(long, env = "OPNSENSE_API_SECRET", hide_env_values = true)]
    pub opnsense_api_secret: String,

    /// Accept invalid TLS certificates from OPNsense
    #[arg(
        long,
        env = "OPNSENSE_SKIP_TLS_VERIFY",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub opnsense_skip_tls_verify: bool,

    /// Comma-separated domains to manage (empty manages every name)
    #[arg(long, env = "DOMAIN_FILTER", default_value = "")]
    pub domain_filter: String,

    /// Comma-separated domains never to manage
    #[arg(long, env = "EXCLUDE_DOMAINS", default_value = "")]
    pub exclude_domains: String,

    /// Ingress classes pinned to static addresses, e.g. "nginx=10.0.0.5,traefik=10.0.0.6"
    #[arg(long, env = "INGRESS_CLASS_MAPPING", default_value = "")]
    pub ingress_class_mapping: String,

    /// Listen address for the external-dns webhook API
    #[arg(long, env = "WEBHOOK_ADDR", default_value = DEFAULT_WEBHOOK_ADDR)]
    pub webhook_addr: SocketAddr,

    /// Listen address for health and metrics
    #[arg(long, env = "HEALTH_ADDR", default_value = DEFAULT_HEALTH_ADDR)]
    pub health_addr: SocketAddr,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("opnsense_host", &self.opnsense_host)
            .field("opnsense_api_key", &self.opnsense_api_key)
            .field("opnsense_api_secret", &"<redacted>")
            .field("opnsense_skip_tls_verify", &self.opnsense_skip_tls_verify)
            .field("domain_filter", &self.domain_filter)
            .field("exclude_domains", &self.exclude_domains)
            .field("ingress_class_mapping", &self.ingress_class_mapping)
            .field("webhook_addr", &self.webhook_addr)
            .field("health_addr", &self.health_addr)
            .finish()
    }
}

impl Config {
    /// Connection settings for the OPNsense API.
    #[must_use]
    pub fn opnsense(&self) -> OpnsenseConfig {
        OpnsenseConfig {
            host: self.opnsense_host.clone(),
            api_key: self.opnsense_api_key.clone(),
            api_secret: self.opnsense_api_secret.clone(),
            skip_tls_verify: self.opnsense_skip_tls_verify,
        }
    }

    #[must_use]
    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter::from_csv(&self.domain_filter, &self.exclude_domains)
    }

    /// Parse the ingress-class mapping. Malformed pairs are dropped.
    #[must_use]
    pub fn ingress_classes(&self) -> IngressClassMap {
        IngressClassMap::parse(&self.ingress_class_mapping)
    }
}

/// OPNsense API connection settings.
#[derive(Clone)]
pub struct OpnsenseConfig {
    /// Host, optionally with scheme and port
    pub host: String,
    pub api_key: String,
    pub api_secret: String,
    pub skip_tls_verify: bool,
}

impl fmt::Debug for OpnsenseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpnsenseConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}
