#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use webmarket_api::config::{ServerConfig, SupabaseConfig};
use webmarket_api::router::build_app_router;
use webmarket_api::state::AppState;
use webmarket_core::scope::ScopeClaims;
use webmarket_db::gateways::MemoryGateway;
use webmarket_db::repositories::todo_repo::TODOS_TABLE;
use webmarket_db::submissions::FormSubmissionStore;
use webmarket_db::{ScopedClient, ScopedCredential};

pub const TEST_TENANT: &str = "tenant-test";
pub const TEST_PROJECT: &str = "project-test";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:3000` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(data_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        data_dir: data_dir.to_path_buf(),
        supabase: SupabaseConfig::local(TEST_TENANT, TEST_PROJECT),
    }
}

/// Application router plus handles tests use to inspect or seed state.
pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MemoryGateway>,
    pub store: Arc<FormSubmissionStore>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers over a
/// temp data directory and an in-memory `todos` table.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path());

    let gateway = Arc::new(MemoryGateway::new().with_table(TODOS_TABLE));
    let scope = ScopeClaims::new(TEST_TENANT, TEST_PROJECT);
    let db = ScopedClient::new(
        gateway.clone(),
        ScopedCredential::local(scope.clone()),
        scope,
    );
    let store = Arc::new(FormSubmissionStore::new(&config.data_dir));

    let state = AppState {
        submissions: Arc::clone(&store),
        db,
        mailer: None,
    };

    TestApp {
        router: build_app_router(state, &config),
        gateway,
        store,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
