// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain ownership filter.
//!
//! Restricts which DNS names the webhook reads from and writes to Unbound. The
//! filter is handed to external-dns during negotiation so both sides agree on
//! the managed namespace.

use serde::{Deserialize, Serialize};

/// Include/exclude list of domain suffixes.
///
/// # Example
///
/// ```
/// use unbound_webhook::DomainFilter;
///
/// let filter = DomainFilter::new(vec!["example.com".into()], vec!["internal.example.com".into()]);
///
/// assert!(filter.match_name("www.example.com"));
/// assert!(!filter.match_name("db.internal.example.com"));
/// assert!(!filter.match_name("example.org"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilter {
    /// Suffixes a name must match (empty means every name)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Suffixes that always reject a name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl DomainFilter {
    /// Build a filter, normalizing and dropping blank entries.
    #[must_use]
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include: normalize_all(include),
            exclude: normalize_all(exclude),
        }
    }

    /// Build a filter from comma-separated configuration strings.
    #[must_use]
    pub fn from_csv(include: &str, exclude: &str) -> Self {
        let split = |list: &str| -> Vec<String> { list.split(',').map(str::to_string).collect() };
        Self::new(split(include), split(exclude))
    }

    /// Whether `name` is managed by this filter.
    #[must_use]
    pub fn match_name(&self, name: &str) -> bool {
        let name = normalize(name);

        if self.exclude.iter().any(|domain| matches_suffix(&name, domain)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|domain| matches_suffix(&name, domain))
    }

    /// `true` when neither list has entries.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn normalize_all(domains: Vec<String>) -> Vec<String> {
    domains
        .iter()
        .map(|domain| normalize(domain))
        .filter(|domain| !domain.is_empty())
        .collect()
}

/// A filter with a leading `.` matches subdomains only; otherwise the apex
/// matches too.
fn matches_suffix(name: &str, domain: &str) -> bool {
    if domain.starts_with('.') {
        return name.len() > domain.len() && name.ends_with(domain);
    }

    name == domain
        || name
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
#[path = "domain_filter_tests.rs"]
mod domain_filter_tests;
