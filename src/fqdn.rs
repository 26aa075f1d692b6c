// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conversions between fully-qualified names and Unbound's hostname/domain pairs.
//!
//! Unbound host overrides store a record as a leftmost `hostname` label plus the
//! remaining `domain`, and report the record type with a human-readable suffix
//! such as `A (IPv4 address)`. These helpers translate between that shape and
//! the single FQDN and bare type token external-dns works with.

/// Split a FQDN on its first `.` into `(hostname, domain)`.
///
/// A name without any `.` yields an empty domain.
///
/// # Example
///
/// ```
/// use unbound_webhook::fqdn::split;
///
/// assert_eq!(split("www.example.com"), ("www", "example.com"));
/// assert_eq!(split("localhost"), ("localhost", ""));
/// ```
#[must_use]
pub fn split(fqdn: &str) -> (&str, &str) {
    fqdn.split_once('.').unwrap_or((fqdn, ""))
}

/// Join a hostname and domain with a single `.`.
///
/// The separator is always written, so an empty domain leaves a trailing dot.
///
/// # Example
///
/// ```
/// use unbound_webhook::fqdn::join;
///
/// assert_eq!(join("www", "example.com"), "www.example.com");
/// assert_eq!(join("host", ""), "host.");
/// ```
#[must_use]
pub fn join(hostname: &str, domain: &str) -> String {
    format!("{hostname}.{domain}")
}

/// Strip the descriptive suffix from an Unbound record type.
///
/// Returns everything before the first space, or the whole string when there is none.
///
/// # Example
///
/// ```
/// use unbound_webhook::fqdn::prune_type;
///
/// assert_eq!(prune_type("A (IPv4 address)"), "A");
/// assert_eq!(prune_type("CNAME"), "CNAME");
/// ```
#[must_use]
pub fn prune_type(unbound_type: &str) -> &str {
    unbound_type
        .split_once(' ')
        .map_or(unbound_type, |(token, _)| token)
}

/// Add the descriptive suffix Unbound shows for address records.
///
/// Only `A` and `AAAA` are embellished; every other type is returned unchanged.
#[must_use]
pub fn embellish_type(record_type: &str) -> String {
    match record_type {
        "A" => format!("{record_type} (IPv4 address)"),
        "AAAA" => format!("{record_type} (IPv6 address)"),
        _ => record_type.to_string(),
    }
}

#[cfg(test)]
#[path = "fqdn_tests.rs"]
mod fqdn_tests;
