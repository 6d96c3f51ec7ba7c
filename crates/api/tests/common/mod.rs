//! Shared helpers for API integration tests.
//!
//! Mirrors the router construction in `main.rs` (via
//! [`build_app_router`]) so integration tests exercise the same middleware
//! stack that production uses. The scheduler is constructed but not
//! started — tests drive scans through the manual trigger endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use helpdesk_api::config::ServerConfig;
use helpdesk_api::router::build_app_router;
use helpdesk_api::state::AppState;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::time::SystemClock;
use helpdesk_core::types::DbId;
use helpdesk_notify::{DbRecipientResolver, Dispatcher, InAppStore};
use helpdesk_sla::{SlaScanner, SlaScheduler};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        sla_scan_interval_secs: 3600,
        sla_warning_ratio: 0.75,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let clock = Arc::new(SystemClock);

    let scanner = Arc::new(SlaScanner::new(
        pool.clone(),
        SlaPolicySet::default(),
        clock.clone(),
        Arc::new(DbRecipientResolver::new(pool.clone())),
        Dispatcher::new(None, None, InAppStore::new(pool.clone())),
    ));
    let scheduler = Arc::new(SlaScheduler::new(
        scanner,
        Duration::from_secs(config.sla_scan_interval_secs),
        clock,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        scheduler,
    };
    build_app_router(state, &config)
}

/// Seed a user row and return its id.
pub async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind("Test User")
        .fetch_one(pool)
        .await
        .expect("seed user")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// GET a path with no identity header.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// GET a path on behalf of a user.
pub async fn get_as(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a path with an empty body.
pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a path on behalf of a user.
pub async fn post_as(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// PUT a JSON body on behalf of a user.
pub async fn put_json_as(
    app: Router,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("x-user-id", user_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
