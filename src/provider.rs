// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation between external-dns and Unbound host overrides.
//!
//! [`UnboundProvider`] is stateless between calls. Each operation performs its
//! remote calls sequentially and returns after the last one, or after the first
//! failure. Callers serialize access themselves; external-dns drives one
//! reconciliation at a time.
//!
//! # Apply ordering
//!
//! [`UnboundProvider::apply_changes`] deletes before it creates, so a record that
//! changes target never collides with its stale copy in the store:
//!
//! 1. delete `UpdateOld` then `Delete`
//! 2. create `Create` then `UpdateNew`, each after the CNAME to A rewrite
//! 3. reconfigure Unbound once
//!
//! The first failure aborts the remaining steps. Mutations already performed are
//! not rolled back. Each mutation the store accepts is counted in the
//! host-override changes metric.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::client::HostOverrideClient;
use crate::domain_filter::DomainFilter;
use crate::endpoint::{Changes, Endpoint};
use crate::errors::{ApplyError, ClientError};
use crate::ingress_class::IngressClassMap;
use crate::metrics;
use crate::rewrite::cname_to_a;

/// external-dns provider backed by an Unbound host-override store.
#[derive(Clone)]
pub struct UnboundProvider {
    client: Arc<dyn HostOverrideClient>,
    domain_filter: DomainFilter,
    ingress_classes: IngressClassMap,
}

impl std::fmt::Debug for UnboundProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnboundProvider")
            .field("domain_filter", &self.domain_filter)
            .field("ingress_classes", &self.ingress_classes)
            .finish_non_exhaustive()
    }
}

impl UnboundProvider {
    /// Create a provider.
    ///
    /// `domain_filter` and `ingress_classes` are fixed for the provider's lifetime.
    #[must_use]
    pub fn new(
        client: Arc<dyn HostOverrideClient>,
        domain_filter: DomainFilter,
        ingress_classes: IngressClassMap,
    ) -> Self {
        Self {
            client,
            domain_filter,
            ingress_classes,
        }
    }

    /// Current records managed by this provider.
    ///
    /// Host overrides are translated to endpoints, names rejected by the domain
    /// filter are dropped, and the CNAME to A rewrite is applied. The store's
    /// order is preserved.
    ///
    /// # Errors
    ///
    /// Returns the client error unchanged if listing fails; no partial result is returned.
    pub async fn records(&self) -> Result<Vec<Endpoint>, ClientError> {
        debug!("records: retrieving records from opnsense");

        let hosts = self.client.list_host_overrides().await?;

        let endpoints: Vec<Endpoint> = hosts
            .iter()
            .map(|host| host.to_endpoint())
            .filter(|endpoint| self.domain_filter.match_name(&endpoint.dns_name))
            .map(|endpoint| self.rewrite(endpoint))
            .collect();

        debug!("records: retrieved: {endpoints:?}");

        Ok(endpoints)
    }

    /// Apply a change set: deletions, then creations, then one reconfigure.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Delete`] or [`ApplyError::Create`] for the first
    /// failing mutation, after which nothing else is attempted, and
    /// [`ApplyError::Reconfigure`] when every mutation succeeded but Unbound could
    /// not be reconfigured.
    pub async fn apply_changes(&self, changes: &Changes) -> Result<(), ApplyError> {
        for endpoint in changes.update_old.iter().chain(&changes.delete) {
            self.client
                .delete_host_override(endpoint)
                .await
                .map_err(|source| ApplyError::Delete {
                    dns_name: endpoint.dns_name.clone(),
                    record_type: endpoint.record_type.to_string(),
                    source,
                })?;
            metrics::record_host_override_change("delete", endpoint.record_type.as_str());
        }

        for endpoint in changes.create.iter().chain(&changes.update_new) {
            let endpoint = cname_to_a(endpoint, &self.ingress_classes);

            self.client
                .create_host_override(&endpoint)
                .await
                .map_err(|source| ApplyError::Create {
                    dns_name: endpoint.dns_name.clone(),
                    record_type: endpoint.record_type.to_string(),
                    source,
                })?;
            metrics::record_host_override_change("create", endpoint.record_type.as_str());
        }

        self.client
            .reconfigure()
            .await
            .map_err(|source| ApplyError::Reconfigure { source })
    }

    /// Rewrite desired endpoints the way [`apply_changes`](Self::apply_changes) will.
    ///
    /// external-dns then plans against the A record Unbound ends up holding rather
    /// than the CNAME it was asked for, so mapped records do not show a change on
    /// every cycle.
    #[must_use]
    pub fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
            .into_iter()
            .map(|endpoint| self.rewrite(endpoint))
            .collect()
    }

    fn rewrite(&self, endpoint: Endpoint) -> Endpoint {
        let rewritten = match cname_to_a(&endpoint, &self.ingress_classes) {
            Cow::Owned(rewritten) => Some(rewritten),
            Cow::Borrowed(_) => None,
        };
        rewritten.unwrap_or(endpoint)
    }

    /// The domain filter this provider was built with.
    #[must_use]
    pub const fn domain_filter(&self) -> &DomainFilter {
        &self.domain_filter
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
