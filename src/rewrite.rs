// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CNAME to A rewrite for ingress classes pinned to a static address.
//!
//! Ingress controllers often publish only a load-balancer alias. When the
//! endpoint's ingress class has an entry in the [`IngressClassMap`], the alias
//! is replaced by an A record pointing at the pinned address.

use std::borrow::Cow;

use crate::constants::INGRESS_CLASS_LABEL;
use crate::endpoint::{Endpoint, RecordType};
use crate::ingress_class::IngressClassMap;

/// Rewrite a CNAME endpoint into an A record when its ingress class is mapped.
///
/// Returns the input borrowed when no rewrite applies: the record is not a
/// CNAME, it has no ingress-class label, or the class has no mapping. The input
/// is never modified.
///
/// # Example
///
/// ```
/// use unbound_webhook::{rewrite::cname_to_a, Endpoint, IngressClassMap, RecordType};
///
/// let classes = IngressClassMap::parse("nginx=10.0.0.5");
/// let endpoint = Endpoint::new("app.example.com", "CNAME", vec!["lb.example.com".into()])
///     .with_label("kubernetes.io/ingress.class", "nginx");
///
/// let rewritten = cname_to_a(&endpoint, &classes);
/// assert_eq!(rewritten.record_type, RecordType::A);
/// assert_eq!(rewritten.targets, vec!["10.0.0.5"]);
/// ```
#[must_use]
pub fn cname_to_a<'a>(endpoint: &'a Endpoint, classes: &IngressClassMap) -> Cow<'a, Endpoint> {
    if endpoint.record_type != RecordType::CNAME {
        return Cow::Borrowed(endpoint);
    }

    let Some(address) = endpoint
        .label(INGRESS_CLASS_LABEL)
        .and_then(|class| classes.get(class))
    else {
        return Cow::Borrowed(endpoint);
    };

    Cow::Owned(Endpoint {
        dns_name: endpoint.dns_name.clone(),
        targets: vec![address.to_string()],
        record_type: RecordType::A,
        set_identifier: None,
        record_ttl: None,
        labels: endpoint.labels.clone(),
        provider_specific: Vec::new(),
    })
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod rewrite_tests;
