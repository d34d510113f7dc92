//! Integration tests against a fake Docker Hub.
//!
//! Each test starts an axum server on a loopback port that implements the
//! login, repository, tag listing and tag delete endpoints, and records every
//! request it receives so the tests can assert on the exact calls made.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use hubprune_core::{Credentials, RepositoryId, RetentionPolicy};
use hubprune_registry::{
    HubClient, HubError, HubSession, NoopObserver, PageRequest, PaginationStrategy,
    RegistryConfig, SweepOptions, Sweeper,
};
use serde_json::json;

const PASSWORD: &str = "correct-horse";
const TOKEN: &str = "t0k3n";

/// A request as seen by the fake hub.
#[derive(Debug, Clone)]
struct Seen {
    line: String,
    authorization: Option<String>,
    content_type: Option<String>,
}

#[derive(Default)]
struct FakeHub {
    /// Tags per repository, as (name, last_updated).
    tags: Mutex<BTreeMap<String, Vec<(String, String)>>>,
    /// Tags whose deletion is refused.
    locked: Vec<String>,
    /// Omit the token from successful logins.
    tokenless: bool,
    /// Issue a token containing a newline.
    garbled_token: bool,
    requests: Mutex<Vec<Seen>>,
}

impl FakeHub {
    fn with_tags(self, repo: &str, tags: &[(&str, &str)]) -> Self {
        self.tags.lock().unwrap().insert(
            repo.to_string(),
            tags.iter()
                .map(|(n, d)| ((*n).to_string(), (*d).to_string()))
                .collect(),
        );
        self
    }

    fn record(&self, line: String, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        self.requests.lock().unwrap().push(Seen {
            line,
            authorization: header("authorization"),
            content_type: header("content-type"),
        });
    }

    fn lines(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.line.clone())
            .collect()
    }

    fn requests(&self) -> Vec<Seen> {
        self.requests.lock().unwrap().clone()
    }
}

type Hub = Arc<FakeHub>;

fn query_string(params: &HashMap<String, String>) -> String {
    let mut keys: Vec<_> = params.iter().collect();
    keys.sort();
    keys.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn login(
    State(hub): State<Hub>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    hub.record("POST /v2/users/login/".to_string(), &headers);

    if form.get("password").map(String::as_str) != Some(PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect authentication credentials"})),
        )
            .into_response();
    }
    if hub.tokenless {
        return Json(json!({"detail": "ok"})).into_response();
    }
    if hub.garbled_token {
        return Json(json!({"token": "t0k\nen"})).into_response();
    }
    Json(json!({"token": TOKEN})).into_response()
}

async fn list_repositories(
    State(hub): State<Hub>,
    Path(owner): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    hub.record(
        format!("GET /v2/repositories/{owner}/?{}", query_string(&params)),
        &headers,
    );
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let tags = hub.tags.lock().unwrap();
    let results: Vec<_> = tags
        .keys()
        .filter_map(|repo| repo.split_once('/'))
        .filter(|(ns, _)| *ns == owner)
        .map(|(ns, name)| json!({"namespace": ns, "name": name, "repository_type": "image"}))
        .collect();
    Json(json!({"count": results.len(), "next": null, "results": results})).into_response()
}

async fn list_tags(
    State(hub): State<Hub>,
    Path((namespace, name)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    hub.record(
        format!(
            "GET /v2/repositories/{namespace}/{name}/tags?{}",
            query_string(&params)
        ),
        &headers,
    );
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let repo = format!("{namespace}/{name}");
    let tags = hub.tags.lock().unwrap();
    let Some(all) = tags.get(&repo) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "object not found"})))
            .into_response();
    };

    let page_size: usize = params
        .get("page_size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let page: usize = params
        .get("page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    let start = (page - 1) * page_size;
    let results: Vec<_> = all
        .iter()
        .skip(start)
        .take(page_size)
        .map(|(n, d)| json!({"name": n, "last_updated": d, "tag_status": "active"}))
        .collect();

    let next = if start + page_size < all.len() {
        let host = headers
            .get("host")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        json!(format!(
            "http://{host}/v2/repositories/{repo}/tags?page={}&page_size={page_size}",
            page + 1
        ))
    } else {
        json!(null)
    };

    Json(json!({"count": all.len(), "next": next, "previous": null, "results": results}))
        .into_response()
}

async fn delete_tag(
    State(hub): State<Hub>,
    Path((namespace, name, tag)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    hub.record(
        format!("DELETE /v2/repositories/{namespace}/{name}/tags/{tag}"),
        &headers,
    );
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if hub.locked.contains(&tag) {
        return (StatusCode::FORBIDDEN, "tag is locked").into_response();
    }

    let repo = format!("{namespace}/{name}");
    if let Some(tags) = hub.tags.lock().unwrap().get_mut(&repo) {
        tags.retain(|(n, _)| *n != tag);
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Starts the fake hub and returns its base URL.
async fn serve(hub: Hub) -> String {
    let app = Router::new()
        .route("/v2/users/login/", post(login))
        .route("/v2/repositories/:owner/", get(list_repositories))
        .route("/v2/repositories/:namespace/:name/tags", get(list_tags))
        .route(
            "/v2/repositories/:namespace/:name/tags/:tag",
            delete(delete_tag),
        )
        .with_state(hub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn session(hub: &Hub) -> HubSession {
    let url = serve(Arc::clone(hub)).await;
    let credentials = Credentials::new("acme", PASSWORD).unwrap();
    HubClient::new(RegistryConfig::new(url))
        .unwrap()
        .login(&credentials)
        .await
        .unwrap()
}

fn march_first() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap()
}

fn acme_app() -> RepositoryId {
    "acme/app".parse().unwrap()
}

#[tokio::test]
async fn test_login_rejected_before_any_listing() {
    let hub: Hub = Arc::new(FakeHub::default().with_tags("acme/app", &[("v1", "2020-01-01")]));
    let url = serve(Arc::clone(&hub)).await;

    let credentials = Credentials::new("acme", "wrong").unwrap();
    let err = HubClient::new(RegistryConfig::new(url))
        .unwrap()
        .login(&credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::AuthenticationFailed { status: 401, .. }));
    assert_eq!(hub.lines(), vec!["POST /v2/users/login/"]);
}

#[tokio::test]
async fn test_login_without_token_is_an_error() {
    let hub: Hub = Arc::new(FakeHub {
        tokenless: true,
        ..FakeHub::default()
    });
    let url = serve(Arc::clone(&hub)).await;

    let credentials = Credentials::new("acme", PASSWORD).unwrap();
    let err = HubClient::new(RegistryConfig::new(url))
        .unwrap()
        .login(&credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::MissingField { field: "token", .. }));
}

#[tokio::test]
async fn test_unusable_token_fails_login() {
    let hub: Hub = Arc::new(
        FakeHub {
            garbled_token: true,
            ..FakeHub::default()
        }
        .with_tags("acme/app", &[("v1", "2020-01-01")]),
    );
    let url = serve(Arc::clone(&hub)).await;

    let credentials = Credentials::new("acme", PASSWORD).unwrap();
    let err = HubClient::new(RegistryConfig::new(url))
        .unwrap()
        .login(&credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::AuthenticationFailed { status: 200, .. }));
    assert_eq!(hub.lines(), vec!["POST /v2/users/login/"]);
}

#[tokio::test]
async fn test_old_tag_deleted_with_bearer_headers() {
    let hub: Hub = Arc::new(
        FakeHub::default().with_tags("acme/app", &[("v1", "2020-01-01T10:11:12.000000Z")]),
    );
    let session = session(&hub).await;
    let policy = RetentionPolicy::new(30, "").unwrap();

    let report = Sweeper::new(&session, &policy, SweepOptions::default().with_now(march_first()))
        .run(&[acme_app()], &mut NoopObserver)
        .await;

    assert_eq!(report.deleted(), 1);
    assert_eq!(
        hub.lines(),
        vec![
            "POST /v2/users/login/",
            "GET /v2/repositories/acme/app/tags?page=1&page_size=100",
            "GET /v2/repositories/acme/app/tags?page=1&page_size=100",
            "DELETE /v2/repositories/acme/app/tags/v1",
        ]
    );

    for seen in hub.requests().iter().skip(1) {
        assert_eq!(seen.authorization.as_deref(), Some("Bearer t0k3n"));
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    }
}

#[tokio::test]
async fn test_excluded_tag_is_not_deleted() {
    let hub: Hub = Arc::new(FakeHub::default().with_tags("acme/app", &[("v1", "2020-01-01")]));
    let session = session(&hub).await;
    let policy = RetentionPolicy::new(30, "^v1$").unwrap();

    let report = Sweeper::new(&session, &policy, SweepOptions::default().with_now(march_first()))
        .run(&[acme_app()], &mut NoopObserver)
        .await;

    assert_eq!(report.skipped(), 1);
    assert!(!hub.lines().iter().any(|l| l.starts_with("DELETE")));
}

#[tokio::test]
async fn test_page_number_walk_visits_last_page_first() {
    let tags: Vec<(String, String)> = (0..5)
        .map(|i| (format!("t{i}"), "2020-02-25".to_string()))
        .collect();
    let tag_refs: Vec<(&str, &str)> = tags.iter().map(|(n, d)| (n.as_str(), d.as_str())).collect();
    let hub: Hub = Arc::new(FakeHub::default().with_tags("acme/app", &tag_refs));
    let session = session(&hub).await;
    let policy = RetentionPolicy::new(30, "").unwrap();

    let options = SweepOptions::default()
        .with_now(march_first())
        .with_page_size(2);
    let report = Sweeper::new(&session, &policy, options)
        .run(&[acme_app()], &mut NoopObserver)
        .await;

    assert_eq!(report.repositories[0].retained, 5);
    assert_eq!(
        hub.lines()[1..],
        [
            "GET /v2/repositories/acme/app/tags?page=1&page_size=2",
            "GET /v2/repositories/acme/app/tags?page=3&page_size=2",
            "GET /v2/repositories/acme/app/tags?page=2&page_size=2",
            "GET /v2/repositories/acme/app/tags?page=1&page_size=2",
        ]
    );
}

#[tokio::test]
async fn test_cursor_walk_makes_exactly_three_calls() {
    let hub: Hub = Arc::new(FakeHub::default().with_tags(
        "acme/app",
        &[("a", "2020-02-29"), ("b", "2020-02-29"), ("c", "2020-02-29")],
    ));
    let session = session(&hub).await;
    let policy = RetentionPolicy::new(30, "").unwrap();

    let options = SweepOptions::default()
        .with_now(march_first())
        .with_page_size(1)
        .with_strategy(PaginationStrategy::Cursor);
    let report = Sweeper::new(&session, &policy, options)
        .run(&[acme_app()], &mut NoopObserver)
        .await;

    assert_eq!(report.repositories[0].pages, 3);
    assert_eq!(
        hub.lines()[1..],
        [
            "GET /v2/repositories/acme/app/tags?page_size=1",
            "GET /v2/repositories/acme/app/tags?page=2&page_size=1",
            "GET /v2/repositories/acme/app/tags?page=3&page_size=1",
        ]
    );
}

#[tokio::test]
async fn test_list_repositories() {
    let hub: Hub = Arc::new(
        FakeHub::default()
            .with_tags("acme/app", &[])
            .with_tags("acme/worker", &[])
            .with_tags("other/thing", &[]),
    );
    let session = session(&hub).await;

    let repos = session.list_repositories("acme").await.unwrap();

    let names: Vec<String> = repos.iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["acme/app", "acme/worker"]);
    assert_eq!(hub.lines()[1], "GET /v2/repositories/acme/?page_size=10000");
}

#[tokio::test]
async fn test_unknown_repository_is_a_listing_error() {
    let hub: Hub = Arc::new(FakeHub::default());
    let session = session(&hub).await;

    let err = session
        .list_tags_page(&"acme/ghost".parse().unwrap(), PageRequest::numbered(100, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::ListingFailed { status: 404, .. }));
    assert!(err.to_string().contains("tags of acme/ghost"));
}

#[tokio::test]
async fn test_refused_delete_reports_status_and_tag() {
    let hub: Hub = Arc::new(FakeHub {
        locked: vec!["pinned".to_string()],
        ..FakeHub::default()
    }
    .with_tags("acme/app", &[("pinned", "2019-01-01"), ("old", "2019-01-01")]));
    let session = session(&hub).await;
    let policy = RetentionPolicy::new(30, "").unwrap();

    let report = Sweeper::new(&session, &policy, SweepOptions::default().with_now(march_first()))
        .run(&[acme_app()], &mut NoopObserver)
        .await;

    let repo = &report.repositories[0];
    assert_eq!(repo.failed, 1);
    assert_eq!(repo.deleted, 1);

    let err = session.delete_tag(&acme_app(), "pinned").await.unwrap_err();
    match err {
        HubError::DeletionFailed {
            tag, status, message, ..
        } => {
            assert_eq!(tag, "pinned");
            assert_eq!(status, 403);
            assert_eq!(message, "tag is locked");
        }
        other => panic!("Expected DeletionFailed, got {other:?}"),
    }
}
