//! In-memory stand-in for the Codecov repository endpoints.
//!
//! Serves `/api/gh/{owner}` and `/api/gh/{owner}/{repo}` from a seeded map,
//! wraps every reply in Codecov's `meta` envelope, and rejects requests that
//! lack an `Authorization: token ...` header.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Repository record as it goes over the wire. Timestamps stay raw strings
/// so fixtures can use any layout Codecov emits.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub language: String,
    pub activated: bool,
    pub deleted: bool,
    pub private: bool,
    pub updatestamp: Option<String>,
    pub branch: String,
    pub coverage: Option<f64>,
    pub repoid: String,
    pub using_integration: bool,
}

pub type Db = Arc<RwLock<HashMap<String, Vec<Repository>>>>;

type Reply = (StatusCode, Json<Value>);

/// Owner `test-account` with one freshly updated repository and one that
/// has never been processed.
pub fn fixtures() -> HashMap<String, Vec<Repository>> {
    let repos = vec![
        Repository {
            name: "guess-my-word".to_string(),
            language: "go".to_string(),
            activated: true,
            updatestamp: Some("2020-05-10 17:55:29.623184+00:00".to_string()),
            branch: "master".to_string(),
            coverage: Some(82.07547),
            repoid: "9384825".to_string(),
            using_integration: true,
            ..Repository::default()
        },
        Repository {
            name: "terraform-provider-jenkins".to_string(),
            language: "go".to_string(),
            updatestamp: None,
            branch: "master".to_string(),
            coverage: None,
            repoid: "9384835".to_string(),
            ..Repository::default()
        },
    ];
    HashMap::from([("test-account".to_string(), repos)])
}

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(fixtures())))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/gh/{owner}", get(list_repositories))
        .route("/api/gh/{owner}/{repo}", get(get_repository))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock codecov api listening");
    }
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, reason: &str) -> Reply {
    tracing::debug!(status = status.as_u16(), reason, "rejecting request");
    (
        status,
        Json(json!({
            "meta": { "status": status.as_u16() },
            "error": { "reason": reason, "context": null },
        })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("token "))
        .is_some_and(|token| !token.is_empty())
}

async fn list_repositories(
    State(db): State<Db>,
    Path(owner): Path<String>,
    headers: HeaderMap,
) -> Reply {
    if !authorized(&headers) {
        return failure(StatusCode::UNAUTHORIZED, "Not authenticated.");
    }
    let db = db.read().await;
    match db.get(&owner) {
        Some(repos) => (
            StatusCode::OK,
            Json(json!({
                "repos": repos,
                "meta": { "status": 200, "limit": 20, "page": 1 },
            })),
        ),
        None => failure(StatusCode::NOT_FOUND, "Team not found."),
    }
}

async fn get_repository(
    State(db): State<Db>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    if !authorized(&headers) {
        return failure(StatusCode::UNAUTHORIZED, "Not authenticated.");
    }
    let db = db.read().await;
    let found = db
        .get(&owner)
        .and_then(|repos| repos.iter().find(|r| r.name == repo));
    match found {
        Some(repo) => (
            StatusCode::OK,
            Json(json!({
                "repo": repo,
                "meta": { "status": 200 },
            })),
        ),
        None => failure(StatusCode::NOT_FOUND, "GitHub API: Not Found"),
    }
}
