// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the Unbound webhook.
//!
//! This module provides specialized error types for:
//! - Translating endpoints into Unbound host overrides
//! - OPNsense HTTP API calls (transport, status, decoding, rejected requests)
//! - Applying an external-dns change set, with the failing phase attached
//!
//! Remote failures are never retried or swallowed; they surface to external-dns,
//! which re-runs the reconciliation on its own schedule.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors converting an endpoint into the host-override model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Unbound stores exactly one target per host override
    ///
    /// Returned for endpoints with no targets or with several targets, instead of
    /// silently keeping only one of them.
    ///
    /// The error aborts the change set at that create, so the final reconfigure
    /// is skipped. Deletes and creates performed earlier in the same cycle stay
    /// in the store but are not served until a later cycle reconfigures
    /// Unbound. As long as the desired state keeps a multi-target endpoint,
    /// every cycle fails at the same point.
    #[error("Endpoint '{dns_name}' has {count} targets; Unbound host overrides hold exactly one")]
    UnsupportedTargets {
        /// The endpoint name
        dns_name: String,
        /// Number of targets carried by the endpoint
        count: usize,
    },

    /// The name has no domain part to file the host override under
    #[error("Endpoint '{dns_name}' has no domain part")]
    MissingDomain {
        /// The endpoint name
        dns_name: String,
    },
}

/// Errors returned by OPNsense API calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced an HTTP response (connection, TLS, timeout)
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        /// Request URL
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// OPNsense answered with a non-success status
    #[error("OPNsense API returned HTTP {status} for {url}: {body}")]
    Status {
        /// Request URL
        url: String,
        /// HTTP status code
        status: StatusCode,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response body was not the JSON shape expected
    #[error("Failed to decode OPNsense response from {url}: {source}")]
    Decode {
        /// Request URL
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// OPNsense accepted the request but reported a failed result
    #[error("OPNsense rejected {operation}: {detail}")]
    Rejected {
        /// Operation name, e.g. `addHostOverride`
        operation: &'static str,
        /// Result and validation messages returned by OPNsense
        detail: String,
    },

    /// The endpoint cannot be represented as a host override
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    /// The configured API base URL could not be used to build a request URL
    #[error("Invalid OPNsense URL '{url}': {source}")]
    InvalidUrl {
        /// The offending URL or path
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ClientError {
    /// HTTP status returned by OPNsense, when the failure carried one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors applying a change set.
///
/// The variant names the phase that failed. Mutations performed before the
/// failure are not rolled back.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Deleting a stale record failed; no creations were attempted
    #[error("Failed to delete {record_type} record '{dns_name}'")]
    Delete {
        /// Endpoint name
        dns_name: String,
        /// Endpoint record type
        record_type: String,
        #[source]
        source: ClientError,
    },

    /// Creating a record failed; remaining creations were skipped
    #[error("Failed to create {record_type} record '{dns_name}'")]
    Create {
        /// Endpoint name
        dns_name: String,
        /// Endpoint record type (after the CNAME rewrite)
        record_type: String,
        #[source]
        source: ClientError,
    },

    /// Every mutation succeeded but Unbound was not reconfigured to serve them
    #[error("Host overrides updated but Unbound reconfigure failed")]
    Reconfigure {
        #[source]
        source: ClientError,
    },
}

impl ApplyError {
    /// `true` when only the final reconfigure step failed.
    #[must_use]
    pub const fn is_reconfigure(&self) -> bool {
        matches!(self, Self::Reconfigure { .. })
    }

    /// The remote failure behind this error.
    #[must_use]
    pub const fn client_error(&self) -> &ClientError {
        match self {
            Self::Delete { source, .. }
            | Self::Create { source, .. }
            | Self::Reconfigure { source } => source,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
