//! Codecov API client and request dispatcher.
//!
//! # Design
//! `Client` holds an endpoint, a credential and a shared `Transport`, and
//! carries no mutable state between calls. Every operation builds a
//! `Request` with a relative path and hands it to `Client::send`, which
//! addresses it against the endpoint, authenticates it, sends it once, and
//! decodes the body into whatever type the caller asked for.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::ResponseError;

const DEFAULT_SCHEME: &str = "https";
const DEFAULT_HOST: &str = "codecov.io";
const DEFAULT_PATH: &str = "/api/";

/// Where requests are sent: scheme, host (with optional port) and a base
/// path that every request path is appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            path: DEFAULT_PATH.to_string(),
        }
    }
}

impl Endpoint {
    /// Split an absolute URL such as `http://127.0.0.1:8080/api` into an
    /// endpoint. Query and fragment are dropped.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            path: url.path().to_string(),
        })
    }

    /// Join `path` onto the base path with exactly one `/` between them.
    fn join(&self, path: &str) -> String {
        let base = self.path.trim_matches('/');
        let relative = path.trim_start_matches('/');
        if base.is_empty() {
            format!("/{relative}")
        } else {
            format!("/{base}/{relative}")
        }
    }
}

/// One API call: a method and a path relative to the endpoint, bound to
/// the caller's context.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub ctx: Context,
}

impl Request {
    pub fn get(ctx: &Context, path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            ctx: ctx.clone(),
        }
    }
}

/// Blocking client for the Codecov REST API.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    endpoint: Endpoint,
    pub(crate) token: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client for the public Codecov API using a default `ureq` agent.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_transport(token, UreqTransport::default())
    }

    pub fn with_transport(token: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            endpoint: Endpoint::default(),
            token: token.into(),
            transport: Arc::new(transport),
        }
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let mut client = Self::with_transport(config.token, UreqTransport::new(config.timeout));
        client.set_endpoint(config.endpoint);
        client
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Point the client somewhere other than the public API, e.g. a local
    /// test server.
    pub fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = endpoint;
    }

    /// Absolute URL for a path relative to the endpoint.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        if self.endpoint.host.is_empty() {
            return Err(ApiError::InvalidRequest("endpoint has no host".to_string()));
        }
        let raw = format!(
            "{}://{}{}",
            self.endpoint.scheme,
            self.endpoint.host,
            self.endpoint.join(path)
        );
        let url = Url::parse(&raw).map_err(|e| ApiError::InvalidRequest(format!("{raw}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::InvalidRequest(format!("unsupported scheme {other:?}"))),
        }
    }

    /// Dispatch `request` once and decode a 200 body into `T`.
    ///
    /// Any other status is decoded as an error envelope and reported as
    /// `ApiError::Api`; if that envelope is unreadable the decode error is
    /// returned instead.
    pub fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let url = self.resolve(&request.path)?;
        let mut http_request = HttpRequest {
            method: request.method,
            url: url.into(),
            headers: Vec::new(),
        };
        self.authorize(&mut http_request);

        request.ctx.check()?;
        debug!(method = request.method.as_str(), url = %http_request.url, "sending codecov request");
        let response = self.transport.send(http_request, &request.ctx)?;
        debug!(status = response.status, bytes = response.body.len(), "codecov response received");

        decode_response(response)
    }
}

fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    match response.status {
        200 => Ok(serde_json::from_slice(&response.body)?),
        status => {
            let envelope: ResponseError = serde_json::from_slice(&response.body)?;
            warn!(status, reason = %envelope.error.reason, "codecov returned an error");
            Err(ApiError::Api {
                status,
                reason: envelope.error.reason,
            })
        }
    }
}
