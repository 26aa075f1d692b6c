// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unbound host-override records and their translation to endpoints.
//!
//! OPNsense lists host overrides as rows of strings:
//!
//! ```json
//! {"uuid": "2f6c...", "enabled": "1", "hostname": "www", "domain": "example.com",
//!  "rr": "A (IPv4 address)", "server": "192.0.2.10", "description": "Managed by external-dns"}
//! ```
//!
//! A host override holds exactly one target, whereas an external-dns endpoint
//! may carry several.

use serde::{Deserialize, Serialize};

use crate::constants::HOST_OVERRIDE_DESCRIPTION;
use crate::endpoint::Endpoint;
use crate::errors::RecordError;
use crate::fqdn;

/// One row of `searchHostOverride`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostOverride {
    pub uuid: String,
    pub enabled: String,
    /// Leftmost label of the name
    pub hostname: String,
    /// Remainder of the name
    pub domain: String,
    /// Record type, possibly with a descriptive suffix
    pub rr: String,
    /// The single target address
    pub server: String,
    pub description: String,
}

impl HostOverride {
    /// Translate into an external-dns endpoint.
    ///
    /// The type suffix is pruned and the server becomes the only target. No labels
    /// are populated.
    #[must_use]
    pub fn to_endpoint(&self) -> Endpoint {
        Endpoint::new(
            fqdn::join(&self.hostname, &self.domain),
            fqdn::prune_type(&self.rr),
            vec![self.server.clone()],
        )
    }

    /// Whether this row stores the record described by `endpoint`.
    ///
    /// Name and type must agree; the server is compared only when the endpoint
    /// carries targets.
    #[must_use]
    pub fn matches(&self, endpoint: &Endpoint) -> bool {
        let (hostname, domain) = fqdn::split(&endpoint.dns_name);

        self.hostname.eq_ignore_ascii_case(hostname)
            && self.domain.eq_ignore_ascii_case(domain)
            && fqdn::prune_type(&self.rr) == endpoint.record_type.as_str()
            && endpoint
                .targets
                .first()
                .is_none_or(|target| *target == self.server)
    }
}

/// Body of an `addHostOverride` request (the `host` object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHostOverride {
    pub enabled: String,
    pub hostname: String,
    pub domain: String,
    pub rr: String,
    pub server: String,
    pub description: String,
}

impl NewHostOverride {
    /// Translate an endpoint into a host override to create.
    ///
    /// The record type is sent as-is.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnsupportedTargets`] unless the endpoint has exactly
    /// one target, and [`RecordError::MissingDomain`] when the name has no `.`.
    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self, RecordError> {
        let [server] = endpoint.targets.as_slice() else {
            return Err(RecordError::UnsupportedTargets {
                dns_name: endpoint.dns_name.clone(),
                count: endpoint.targets.len(),
            });
        };

        let (hostname, domain) = fqdn::split(&endpoint.dns_name);
        if domain.is_empty() {
            return Err(RecordError::MissingDomain {
                dns_name: endpoint.dns_name.clone(),
            });
        }

        Ok(Self {
            enabled: "1".to_string(),
            hostname: hostname.to_string(),
            domain: domain.to_string(),
            rr: endpoint.record_type.to_string(),
            server: server.clone(),
            description: HOST_OVERRIDE_DESCRIPTION.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "host_override_tests.rs"]
mod host_override_tests;
