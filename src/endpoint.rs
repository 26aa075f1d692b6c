// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! external-dns data model: endpoints, record types and change sets.
//!
//! Field names follow the JSON external-dns sends over the webhook protocol,
//! so these types deserialize request bodies directly.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// DNS record type carried by an [`Endpoint`].
///
/// Unknown tokens are kept verbatim in [`RecordType::Other`], so parsing never fails
/// and every token displays back exactly as it was read.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    SRV,
    NS,
    PTR,
    /// Any other token, stored as received
    Other(String),
}

impl RecordType {
    /// The canonical token for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::SRV => "SRV",
            Self::NS => "NS",
            Self::PTR => "PTR",
            Self::Other(token) => token,
        }
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s {
            "A" => Self::A,
            "AAAA" => Self::AAAA,
            "CNAME" => Self::CNAME,
            "MX" => Self::MX,
            "TXT" => Self::TXT,
            "SRV" => Self::SRV,
            "NS" => Self::NS,
            "PTR" => Self::PTR,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(record_type: RecordType) -> Self {
        record_type.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific key/value pair attached to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

/// One DNS record as external-dns models it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully-qualified record name
    pub dns_name: String,

    /// Record targets (addresses or alias names)
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,

    pub record_type: RecordType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    #[serde(
        rename = "recordTTL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub record_ttl: Option<i64>,

    /// Metadata labels, e.g. the ingress class that produced the record
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    /// Create an endpoint without labels or provider-specific properties.
    #[must_use]
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<RecordType>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets,
            record_type: record_type.into(),
            set_identifier: None,
            record_ttl: None,
            labels: BTreeMap::new(),
            provider_specific: Vec::new(),
        }
    }

    /// Add a label, replacing any previous value for the key.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Look up a label value.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Change set external-dns computes for one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub create: Vec<Endpoint>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Endpoint>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Endpoint>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// `true` when there is nothing to create, update or delete.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}

/// external-dns marshals empty Go slices and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
