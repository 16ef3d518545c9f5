use axum::{Router, body::Body, http::Request};
use http_body_util::BodyExt;
use rhizome_tracker::{AppState, build_router, config::Config};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;

/// Upstreams point at a closed local port so nothing leaves the machine.
pub fn test_config(env: &str) -> Config {
    Config {
        database_url: String::new(),
        discord_webhook_url: None,
        env: env.to_string(),
        github_api_key: None,
        icon_api_endpoint: "http://127.0.0.1:9".to_string(),
        icon_tracker_endpoint: "http://127.0.0.1:9".to_string(),
        balanced_api_url: "http://127.0.0.1:9".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: "tests/fixtures/static".to_string(),
        max_workers: 2,
        enable_sync_jobs: false,
    }
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn app_with(db: DatabaseConnection, env: &str) -> Router {
    build_router(AppState::new(db, test_config(env)))
}

pub fn app(env: &str) -> Router {
    app_with(empty_db(), env)
}

pub async fn send(app: Router, request: Request<Body>) -> (axum::http::StatusCode, axum::http::HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn htmx_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("hx-request", "true")
        .body(Body::empty())
        .unwrap()
}
