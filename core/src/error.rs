//! Error types for the Codecov API client.
//!
//! # Design
//! Every failure propagates to the caller unchanged: transport failures keep
//! their cause, decode failures keep the `serde_json` error (timestamp
//! failures arrive through it), and non-200 responses with a readable error
//! envelope become `ApiError::Api`. Nothing here is retried.

use thiserror::Error;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request URL could not be formed from the endpoint and path.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body (success payload or error envelope) was not valid
    /// JSON for the expected shape.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// The server returned a non-200 status with a readable error envelope.
    #[error("{status}: {reason}")]
    Api { status: u16, reason: String },
}

/// Failures while sending a request or receiving its response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("transport worker exited without a response")]
    WorkerLost,

    #[error(transparent)]
    Http(#[from] ureq::Error),
}

/// A date-time string matched none of the known layouts.
#[derive(Debug, Error)]
#[error("cannot parse {input:?} as a timestamp: {source}")]
pub struct TimestampError {
    pub input: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Configuration could not be read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid endpoint {url:?}: {reason}")]
    Endpoint { url: String, reason: String },
}
