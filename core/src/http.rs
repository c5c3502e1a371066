//! HTTP transport seam.
//!
//! # Design
//! Requests and responses are plain data. The `Client` builds an
//! `HttpRequest`, hands it to whatever `Transport` it was constructed with,
//! and interprets the returned `HttpResponse` itself. The default transport
//! is a blocking `ureq` agent; tests substitute scripted transports.
//!
//! A transport must read the whole body before returning so the connection
//! is released on every path, including errors.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ureq::Agent;

use crate::context::Context;
use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// A fully addressed, authenticated request ready to send.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response with its body already read to the end.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends one request and waits for its response.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest, ctx: &Context) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest, ctx: &Context) -> Result<HttpResponse, TransportError> {
        (**self).send(request, ctx)
    }
}

/// Body size accepted by `UreqTransport` unless overridden.
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// How often a cancelable call looks at its context while waiting.
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are returned as data rather than errors so the client can
/// decode the error envelope itself. When the call context can be canceled
/// the exchange runs on a short-lived worker thread so the caller can give
/// up as soon as the context is canceled; otherwise it runs inline.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    body_limit: u64,
}

impl UreqTransport {
    /// Build a transport whose agent gives up after `timeout` when the call
    /// context carries no tighter deadline.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Refuse response bodies larger than `limit` bytes.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest, ctx: &Context) -> Result<HttpResponse, TransportError> {
        let timeout = ctx.remaining();
        if !ctx.is_cancelable() {
            return exchange(&self.agent, request, timeout, self.body_limit)
                .map_err(|err| classify(err, ctx));
        }

        let (tx, rx) = mpsc::channel();
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        thread::spawn(move || {
            // The receiver is gone if the caller already gave up.
            let _ = tx.send(exchange(&agent, request, timeout, body_limit));
        });

        loop {
            match rx.recv_timeout(CANCEL_POLL) {
                Ok(outcome) => return outcome.map_err(|err| classify(err, ctx)),
                Err(RecvTimeoutError::Timeout) => ctx.check()?,
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::WorkerLost),
            }
        }
    }
}

/// One request/response round trip with the body read to the end.
fn exchange(
    agent: &Agent,
    request: HttpRequest,
    timeout: Option<Duration>,
    body_limit: u64,
) -> Result<HttpResponse, ureq::Error> {
    let mut builder = match request.method {
        HttpMethod::Get => agent.get(request.url.as_str()),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if timeout.is_some() {
        builder = builder.config().timeout_global(timeout).build();
    }

    let mut response = builder.call()?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()?;
    Ok(HttpResponse { status, body })
}

/// A ureq timeout under a context deadline is that deadline expiring.
fn classify(err: ureq::Error, ctx: &Context) -> TransportError {
    match err {
        ureq::Error::Timeout(_) if ctx.deadline().is_some() => TransportError::DeadlineExceeded,
        other => TransportError::Http(other),
    }
}
