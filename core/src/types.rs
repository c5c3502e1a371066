//! Envelope types shared by every Codecov response.
//!
//! # Design
//! Codecov wraps each payload in an object carrying a `meta` block, and
//! error responses add an `error` block. Operation-specific envelopes embed
//! `Meta` alongside their payload field. Unknown fields are ignored and JSON
//! `null` decodes to the zero value, since the API sends `null` freely.

use serde::{Deserialize, Deserializer, Serialize};

/// Status metadata returned with most responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "null_as_default")]
    pub status: i64,
}

/// The smallest envelope: just the status block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
}

/// Human-readable failure reason from an error envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

/// Envelope returned with non-200 responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseError {
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
    #[serde(deserialize_with = "null_as_default")]
    pub error: ErrorBody,
}

/// Decode `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
