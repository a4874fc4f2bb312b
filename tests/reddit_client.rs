// Reddit client tests against a local fake of the OAuth API.
//
// An axum router bound to 127.0.0.1:0 stands in for both the token host and
// the API host, so the real RedditClient (auth, query building, status
// mapping, payload decoding) runs end to end without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use churnlens::activity::error::ActivityError;
use churnlens::activity::traits::{ActivitySource, CommentNode};
use churnlens::reddit::client::{Credentials, RedditClient};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct FakeReddit {
    token_requests: Arc<AtomicUsize>,
    reject_credentials: bool,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn access_token(State(fake): State<FakeReddit>, headers: HeaderMap) -> Response {
    fake.token_requests.fetch_add(1, Ordering::SeqCst);

    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !basic {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if fake.reject_credentials {
        return Json(json!({ "error": "invalid_grant" })).into_response();
    }
    Json(json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn about(Path(name): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match name.as_str() {
        "alice" => Json(json!({
            "kind": "t2",
            "data": {
                "name": "alice",
                "created_utc": 1577836800.0,
                "link_karma": 10,
                "comment_karma": 20,
                "verified": true
            }
        }))
        .into_response(),
        "limited" => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "7")],
            "slow down",
        )
            .into_response(),
        "limited_bare" => StatusCode::TOO_MANY_REQUESTS.into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Echoes back as many posts as the `limit` parameter asks for.
async fn submitted(
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("sort").map(String::as_str) != Some("new")
        || params.get("raw_json").map(String::as_str) != Some("1")
    {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(25);

    let children: Vec<_> = (0..limit)
        .map(|i| {
            json!({
                "kind": "t3",
                "data": {
                    "id": format!("{name}{i}"),
                    "score": i,
                    "num_comments": 1,
                    "subreddit": "rust",
                    "link_flair_text": ""
                }
            })
        })
        .collect();

    Json(json!({ "kind": "Listing", "data": { "after": null, "children": children } }))
        .into_response()
}

async fn comments(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "kind": "Listing", "data": { "children": [{ "kind": "t3", "data": { "id": id } }] } },
        { "kind": "Listing", "data": { "children": [
            { "kind": "t1", "data": { "author": "bob", "replies": {
                "kind": "Listing", "data": { "children": [
                    { "kind": "t1", "data": { "author": "alice", "replies": "" } }
                ] }
            } } },
            { "kind": "more", "data": { "count": 3, "children": ["c1"] } }
        ] } }
    ]))
    .into_response()
}

/// Start the fake on an ephemeral port and return its base URL.
async fn spawn(fake: FakeReddit) -> String {
    let app = Router::new()
        .route("/api/v1/access_token", post(access_token))
        .route("/user/{name}/about", get(about))
        .route("/user/{name}/submitted", get(submitted))
        .route("/comments/{id}", get(comments))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> RedditClient {
    RedditClient::new(
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "churnlens-tests/0.1".to_string(),
        },
        base,
        base,
    )
    .unwrap()
}

// ============================================================
// Successful reads
// ============================================================

#[tokio::test]
async fn fetch_user_decodes_account() {
    let base = spawn(FakeReddit::default()).await;
    let info = client(&base).fetch_user("alice").await.unwrap();

    assert_eq!(info.username, "alice");
    assert_eq!(info.created_utc, "2020-01-01 00:00:00");
    assert_eq!(info.link_karma, 10);
    assert!(info.verified);
    assert!(!info.has_verified_email);
}

#[tokio::test]
async fn recent_posts_pass_sort_and_limit() {
    let base = spawn(FakeReddit::default()).await;
    let posts = client(&base).fetch_recent_posts("alice", 3).await.unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].id, "alice0");
    assert_eq!(posts[2].score, 2);
    // Empty flair text reads as no flair.
    assert!(posts.iter().all(|p| p.flair.is_none()));
}

#[tokio::test]
async fn comment_forest_keeps_more_stubs() {
    let base = spawn(FakeReddit::default()).await;
    let forest = client(&base).fetch_comment_forest("p1").await.unwrap();

    assert_eq!(forest.len(), 2);
    match &forest[0] {
        CommentNode::Comment(c) => {
            assert_eq!(c.author.as_deref(), Some("bob"));
            assert_eq!(c.replies.len(), 1);
        }
        CommentNode::More => panic!("expected a comment"),
    }
    assert_eq!(forest[1], CommentNode::More);
}

// ============================================================
// Token handling
// ============================================================

#[tokio::test]
async fn token_is_cached_across_calls() {
    let fake = FakeReddit::default();
    let requests = fake.token_requests.clone();
    let base = spawn(fake).await;
    let reddit = client(&base);

    reddit.fetch_user("alice").await.unwrap();
    reddit.fetch_recent_posts("alice", 1).await.unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_credentials_are_upstream() {
    let base = spawn(FakeReddit {
        reject_credentials: true,
        ..Default::default()
    })
    .await;

    let err = client(&base).fetch_user("alice").await.unwrap_err();
    assert_eq!(err.kind(), "upstream");
    assert!(err.to_string().contains("invalid_grant"));
}

// ============================================================
// Status mapping
// ============================================================

#[tokio::test]
async fn missing_user_is_not_found() {
    let base = spawn(FakeReddit::default()).await;
    let err = client(&base).fetch_user("ghost").await.unwrap_err();

    match err {
        ActivityError::NotFound { resource } => assert_eq!(resource, "/user/ghost/about"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_reads_retry_after() {
    let base = spawn(FakeReddit::default()).await;
    let err = client(&base).fetch_user("limited").await.unwrap_err();

    match err {
        ActivityError::RateLimited { retry_after } => assert_eq!(retry_after, 7),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_without_header_defaults_to_sixty_seconds() {
    let base = spawn(FakeReddit::default()).await;
    let err = client(&base).fetch_user("limited_bare").await.unwrap_err();

    match err {
        ActivityError::RateLimited { retry_after } => assert_eq!(retry_after, 60),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_upstream() {
    let base = spawn(FakeReddit::default()).await;
    let err = client(&base).fetch_user("broken").await.unwrap_err();

    assert_eq!(err.kind(), "upstream");
    let message = err.to_string();
    assert!(message.contains("500"), "unexpected message: {message}");
    assert!(message.contains("boom"), "unexpected message: {message}");
}
