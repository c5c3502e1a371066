//! Blocking client for the Codecov REST API.
//!
//! # Overview
//! `Client` turns an operation such as `list_repositories` into an
//! authenticated HTTP request against the configured endpoint, sends it once
//! through an injected `Transport`, and decodes the JSON envelope into typed
//! structures. Timestamps are normalized to UTC whatever layout the API used.
//!
//! # Design
//! - `Client` holds only immutable configuration and is safe to share.
//! - The transport is a trait object; `UreqTransport` is the default.
//! - Each call carries a `Context` that can cancel it or bound its wait.
//! - No retries, pagination or caching: one request per call.

mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod repositories;
pub mod timestamp;
pub mod types;

pub use client::{Client, Endpoint, Request};
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{ApiError, ConfigError, TimestampError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use repositories::{GetRepositoryResponse, ListRepositoriesResponse, Repository};
pub use timestamp::Timestamp;
pub use types::{ErrorBody, Meta, Response, ResponseError};
