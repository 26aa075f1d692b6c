// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Static ingress-class to address mapping.
//!
//! Operators pin an ingress class to a known address (for example a fronting
//! proxy) with a flat `class=address` list:
//!
//! ```text
//! INGRESS_CLASS_MAPPING="nginx=10.0.0.5,traefik=10.0.0.6"
//! ```

use std::collections::HashMap;

/// Mapping from ingress-class label to a static IP literal.
///
/// Built once at start-up and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressClassMap {
    addresses: HashMap<String, String>,
}

impl IngressClassMap {
    /// Parse a `key=value,key=value` mapping.
    ///
    /// Whitespace around keys and values is trimmed. A pair that does not split
    /// into exactly two parts on `=` is dropped without error, and an empty
    /// string yields an empty map.
    ///
    /// # Example
    ///
    /// ```
    /// use unbound_webhook::IngressClassMap;
    ///
    /// let map = IngressClassMap::parse("nginx = 10.0.0.5, bad=1=2");
    /// assert_eq!(map.get("nginx"), Some("10.0.0.5"));
    /// assert_eq!(map.get("bad"), None);
    /// ```
    #[must_use]
    pub fn parse(mapping: &str) -> Self {
        if mapping.is_empty() {
            return Self::default();
        }

        let addresses = mapping
            .split(',')
            .filter_map(|pair| {
                let parts: Vec<&str> = pair.split('=').collect();
                match parts.as_slice() {
                    [class, address] => Some((class.trim().to_string(), address.trim().to_string())),
                    _ => None,
                }
            })
            .collect();

        Self { addresses }
    }

    /// Address pinned for an ingress class.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&str> {
        self.addresses.get(class).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IngressClassMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            addresses: iter
                .into_iter()
                .map(|(class, address)| (class.into(), address.into()))
                .collect(),
        }
    }
}
