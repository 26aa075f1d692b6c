// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Unbound webhook.
//!
//! This module contains all string and numeric constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Endpoint Label Constants
// ============================================================================

/// Endpoint label carrying the ingress class that produced the record
pub const INGRESS_CLASS_LABEL: &str = "kubernetes.io/ingress.class";

// ============================================================================
// OPNsense API Constants
// ============================================================================

/// Lists every Unbound host override
pub const API_SEARCH_HOST_OVERRIDE: &str = "api/unbound/settings/searchHostOverride";

/// Creates a host override
pub const API_ADD_HOST_OVERRIDE: &str = "api/unbound/settings/addHostOverride";

/// Deletes a host override; the uuid is appended as the last path segment
pub const API_DEL_HOST_OVERRIDE: &str = "api/unbound/settings/delHostOverride";

/// Applies pending Unbound configuration so the resolver serves it
pub const API_RECONFIGURE: &str = "api/unbound/service/reconfigure";

/// `result` value OPNsense returns for a stored host override
pub const RESULT_SAVED: &str = "saved";

/// `result` value OPNsense returns for a removed host override
pub const RESULT_DELETED: &str = "deleted";

/// `status` value OPNsense returns for a successful reconfigure
pub const STATUS_OK: &str = "ok";

/// Description stamped on every host override this webhook creates
pub const HOST_OVERRIDE_DESCRIPTION: &str = "Managed by external-dns";

// ============================================================================
// Webhook Protocol Constants
// ============================================================================

/// Media type external-dns negotiates with webhook providers
pub const WEBHOOK_MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";

/// Default listen address for the webhook API (external-dns talks to localhost)
pub const DEFAULT_WEBHOOK_ADDR: &str = "127.0.0.1:8888";

/// Default listen address for health and metrics
pub const DEFAULT_HEALTH_ADDR: &str = "0.0.0.0:8080";

/// Path for the liveness endpoint
pub const HEALTH_PATH: &str = "/healthz";

/// Path for Prometheus metrics endpoint
pub const METRICS_PATH: &str = "/metrics";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
