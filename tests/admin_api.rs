//! HTTP surface tests: routing, key validation, the auth gate, and server
//! startup/shutdown.

use std::sync::Arc;
use std::time::Duration;

use atlascms::config::ServerConfig;
use atlascms::db::{DatabaseBackend, SqliteBackend};
use atlascms::server::{router, AdminServer, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::broadcast;
use tower::ServiceExt;

async fn open_state() -> AppState {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();
  let mut config = ServerConfig::default();
  config.auth.enabled = false;
  AppState {
    backend: Arc::new(backend),
    config,
    start_time: std::time::Instant::now(),
  }
}

fn get(uri: &str) -> Request<Body> {
  Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_probe() {
  let app = router(open_state().await);
  let res = app.oneshot(get("/health")).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_content_rejects_malformed_key() {
  let app = router(open_state().await);
  // decodes to "Home Page", which is not a valid content key
  let res = app.oneshot(get("/api/content/Home%20Page")).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_content_unknown_key_serves_default() {
  let app = router(open_state().await);
  let res = app.oneshot(get("/api/content/home")).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);

  let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
  assert_eq!(value["origin"], "default");
  assert_eq!(value["key"], "home");
}

#[tokio::test]
async fn test_protected_routes_require_session() {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();
  let state = AppState {
    backend: Arc::new(backend),
    config: ServerConfig::default(), // auth enabled
    start_time: std::time::Instant::now(),
  };

  let app = router(state);
  let res = app.oneshot(get("/api/content/home")).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_server_run_stops_on_shutdown_signal() {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();

  let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
  let server = AdminServer::new(Arc::new(backend), ServerConfig::default(), shutdown_rx);
  let handle = tokio::spawn(async move { server.run("127.0.0.1:0").await });

  tokio::time::sleep(Duration::from_millis(100)).await;
  shutdown_tx.send(()).unwrap();

  let result = tokio::time::timeout(Duration::from_secs(5), handle)
    .await
    .expect("server did not shut down")
    .unwrap();
  assert!(result.is_ok());
}
