//! Repository endpoints.
//!
//! <https://docs.codecov.io/reference#repositories>

use serde::{Deserialize, Serialize};

use crate::client::{Client, Request};
use crate::context::Context;
use crate::error::ApiError;
use crate::timestamp::Timestamp;
use crate::types::{null_as_default, Meta};

/// A VCS repository tracked by Codecov.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Primary programming language.
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(deserialize_with = "null_as_default")]
    pub activated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub deleted: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub private: bool,
    /// Last time Codecov updated this record; `None` when never set.
    pub updatestamp: Option<Timestamp>,
    /// Branch being monitored.
    #[serde(deserialize_with = "null_as_default")]
    pub branch: String,
    /// Current coverage percentage; `0.0` when Codecov has none.
    #[serde(deserialize_with = "null_as_default")]
    pub coverage: f64,
    /// Codecov's internal identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub repoid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub using_integration: bool,
}

/// Envelope returned by `Client::list_repositories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRepositoriesResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub repos: Vec<Repository>,
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
}

/// Envelope returned by `Client::get_repository`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetRepositoryResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub repo: Repository,
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
}

impl Client {
    /// List every repository belonging to `owner`.
    pub fn list_repositories(
        &self,
        ctx: &Context,
        owner: &str,
    ) -> Result<ListRepositoriesResponse, ApiError> {
        self.send(Request::get(ctx, format!("/gh/{owner}")))
    }

    /// Fetch a single repository of `owner`.
    pub fn get_repository(
        &self,
        ctx: &Context,
        owner: &str,
        repo: &str,
    ) -> Result<GetRepositoryResponse, ApiError> {
        self.send(Request::get(ctx, format!("/gh/{owner}/{repo}")))
    }
}
