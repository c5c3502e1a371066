//! Client configuration.
//!
//! `ClientConfig::from_env` reads:
//! - `CODECOV_TOKEN` (required): API credential.
//! - `CODECOV_API_URL`: endpoint override, e.g. `http://127.0.0.1:3000/api/`.
//! - `CODECOV_TIMEOUT_SECS`: whole-request timeout for the HTTP agent.

use std::time::Duration;

use crate::client::Endpoint;
use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "CODECOV_TOKEN";
pub const API_URL_VAR: &str = "CODECOV_API_URL";
pub const TIMEOUT_VAR: &str = "CODECOV_TIMEOUT_SECS";

/// Everything needed to build a `Client` with the default transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: String,
    pub endpoint: Endpoint,
    /// Applied by the HTTP agent when the call context has no deadline.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: Endpoint::default(),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let mut config = Self::new(token);

        if let Some(url) = lookup(API_URL_VAR) {
            config.endpoint = Endpoint::parse(&url).map_err(|e| ConfigError::Endpoint {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_VAR,
                value: secs.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(parsed));
        }

        Ok(config)
    }
}
