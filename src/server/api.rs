use std::sync::Arc;

use axum::extract::Request;
use axum::{
  extract::{Path, Query, State},
  http::{header, HeaderMap, StatusCode},
  middleware::Next,
  response::{IntoResponse, Response},
  routing::{delete, get, post, put},
  Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

use super::auth;
use crate::config::ServerConfig;
use crate::content::{
  capture, default_document, ContentBinding, ContentKey, DocumentOrigin, LoadOptions,
};
use crate::db::DatabaseBackend;
use crate::review::{
  self, filter_inquiries, filter_profiles, inquiries_to_csv, profiles_to_csv, summarize_inquiries,
  InquiryFilter, ProfileFilter,
};
use crate::types::{AdminUser, NewInquiry, RecordStatus};

type Backend = Arc<dyn DatabaseBackend>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
  pub backend: Backend,
  pub config: ServerConfig,
  pub start_time: std::time::Instant,
}

/// The admin panel HTTP API.
pub struct AdminServer {
  backend: Backend,
  config: ServerConfig,
  shutdown_rx: broadcast::Receiver<()>,
}

impl AdminServer {
  pub fn new(backend: Backend, config: ServerConfig, shutdown_rx: broadcast::Receiver<()>) -> Self {
    Self {
      backend,
      config,
      shutdown_rx,
    }
  }

  pub async fn run(mut self, addr: &str) -> Result<(), anyhow::Error> {
    let state = AppState {
      backend: self.backend,
      config: self.config.clone(),
      start_time: std::time::Instant::now(),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Admin API listening on {}", addr);
    axum::serve(listener, app)
      .with_graceful_shutdown(async move {
        let _ = self.shutdown_rx.recv().await;
      })
      .await?;
    Ok(())
  }
}

pub fn router(state: AppState) -> Router {
  // Public surface: probes, auth endpoints, and the marketing-site inquiry
  // ingest.
  let app = Router::new()
    .route("/health", get(health_check))
    .route("/ready", get(readiness_check))
    .route("/api/auth/status", get(api_auth_status))
    .route("/api/auth/setup", post(api_auth_setup))
    .route("/api/auth/login", post(api_auth_login))
    .route("/api/auth/logout", post(api_auth_logout))
    .route("/api/inquiries", post(api_submit_inquiry));

  // Everything the panel edits sits behind the session gate.
  let protected = Router::new()
    .route("/api/status", get(api_status))
    .route("/api/dashboard", get(api_dashboard))
    .route("/api/content", get(api_list_content_keys))
    .route("/api/content/{key}", get(api_get_content))
    .route("/api/content/{key}", put(api_put_content))
    .route("/api/defaults/{key}", get(api_get_default))
    .route("/api/images", post(api_capture_image))
    .route("/api/inquiries", get(api_list_inquiries))
    .route("/api/inquiries/export.csv", get(api_export_inquiries))
    .route("/api/inquiries/{id}", get(api_get_inquiry))
    .route("/api/inquiries/{id}", delete(api_delete_inquiry))
    .route("/api/inquiries/{id}/status", put(api_update_inquiry_status))
    .route("/api/inquiries/{id}/notes", post(api_add_inquiry_note))
    .route("/api/profiles", get(api_list_profiles))
    .route("/api/profiles/export.csv", get(api_export_profiles))
    .route("/api/profiles/{id}", get(api_get_profile))
    .route("/api/profiles/{id}", delete(api_delete_profile))
    .route("/api/profiles/{id}/status", put(api_update_profile_status))
    .layer(axum::middleware::from_fn_with_state(
      state.clone(),
      session_auth_middleware,
    ));

  let cors = cors_layer(&state.config);
  app.merge(protected).layer(cors).with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
  let origins = &config.server.cors_origins;
  if origins.iter().any(|o| o == "*") {
    CorsLayer::new()
      .allow_origin(Any)
      .allow_methods(Any)
      .allow_headers(Any)
  } else {
    let parsed: Vec<http::HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(parsed))
      .allow_methods(Any)
      .allow_headers(Any)
  }
}

// =============================================================================
// Probes & status
// =============================================================================

/// Liveness probe - returns 200 if server is running
async fn health_check() -> StatusCode {
  StatusCode::OK
}

/// Readiness probe - returns 200 if the database is accessible
async fn readiness_check(State(state): State<AppState>) -> StatusCode {
  match state.backend.list_content_keys().await {
    Ok(_) => StatusCode::OK,
    Err(_) => StatusCode::SERVICE_UNAVAILABLE,
  }
}

#[derive(Serialize)]
struct StatusResponse {
  name: &'static str,
  version: &'static str,
  uptime_secs: u64,
}

async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
  Json(StatusResponse {
    name: "AtlasCMS",
    version: env!("CARGO_PKG_VERSION"),
    uptime_secs: state.start_time.elapsed().as_secs(),
  })
}

// =============================================================================
// Content store
// =============================================================================

#[derive(Serialize)]
struct ContentResponse {
  key: String,
  document: serde_json::Value,
  origin: DocumentOrigin,
}

async fn api_list_content_keys(
  State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
  Ok(Json(state.backend.list_content_keys().await?))
}

/// Load a content document through the sync binding: stored value when
/// present, registry default otherwise, with the origin reported so the
/// panel can tell defaults (and failed loads) apart from live content.
async fn api_get_content(
  State(state): State<AppState>,
  Path(key): Path<String>,
) -> Result<Json<ContentResponse>, AppError> {
  crate::db::validate_content_key(&key).map_err(|e| AppError::BadRequest(e.to_string()))?;

  let default = ContentKey::parse(&key)
    .map(default_document)
    .unwrap_or_else(|| serde_json::json!({}));

  let binding = ContentBinding::load(
    state.backend.clone(),
    key.clone(),
    default,
    LoadOptions::default(),
  )
  .await;

  Ok(Json(ContentResponse {
    key,
    document: binding.document().clone(),
    origin: binding.origin(),
  }))
}

async fn api_put_content(
  State(state): State<AppState>,
  Path(key): Path<String>,
  Json(document): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
  crate::db::validate_content_key(&key).map_err(|e| AppError::BadRequest(e.to_string()))?;

  let mut binding = ContentBinding::load(
    state.backend.clone(),
    key.clone(),
    serde_json::json!({}),
    LoadOptions { skip_fetch: true },
  )
  .await;

  let entry = binding.save_document(document).await?;
  tracing::info!(key = %key, "content saved");
  Ok(Json(serde_json::to_value(entry)?))
}

async fn api_get_default(Path(key): Path<String>) -> Result<Json<serde_json::Value>, AppError> {
  match ContentKey::parse(&key) {
    Some(k) => Ok(Json(default_document(k))),
    None => Err(AppError::NotFound(format!("no default for key '{key}'"))),
  }
}

// =============================================================================
// Image capture
// =============================================================================

#[derive(Serialize)]
struct ImageResponse {
  data_uri: String,
  bytes: usize,
}

async fn api_capture_image(
  State(state): State<AppState>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<Json<ImageResponse>, AppError> {
  let declared = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok());
  let policy = state.config.content.image_policy();
  let data_uri =
    capture(&body, declared, &policy).map_err(|e| AppError::BadRequest(e.to_string()))?;
  Ok(Json(ImageResponse {
    bytes: data_uri.len(),
    data_uri,
  }))
}

// =============================================================================
// Inquiries
// =============================================================================

async fn api_submit_inquiry(
  State(state): State<AppState>,
  Json(new): Json<NewInquiry>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
  if new.name.trim().is_empty() || new.email.trim().is_empty() {
    return Err(AppError::BadRequest("name and email are required".into()));
  }
  let inquiry = state.backend.insert_inquiry(new).await?;
  tracing::info!(id = %inquiry.id, "inquiry received");
  Ok((StatusCode::CREATED, Json(serde_json::to_value(inquiry)?)))
}

async fn api_list_inquiries(
  State(state): State<AppState>,
  Query(filter): Query<InquiryFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
  let rows = state.backend.list_inquiries().await?;
  let filtered = filter_inquiries(&rows, &filter);
  Ok(Json(serde_json::to_value(filtered)?))
}

async fn api_export_inquiries(
  State(state): State<AppState>,
  Query(filter): Query<InquiryFilter>,
) -> Result<Response, AppError> {
  let rows = state.backend.list_inquiries().await?;
  let filtered = filter_inquiries(&rows, &filter);
  let csv = inquiries_to_csv(&filtered);
  Ok(csv_download(csv, "inquiries.csv"))
}

async fn api_get_inquiry(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  match state.backend.get_inquiry(id).await? {
    Some(row) => Ok(Json(serde_json::to_value(row)?)),
    None => Err(AppError::NotFound("inquiry not found".to_string())),
  }
}

#[derive(Deserialize)]
struct StatusUpdate {
  status: String,
}

async fn api_update_inquiry_status(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Json(update): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  let status = RecordStatus::new(update.status);
  match state.backend.update_inquiry_status(id, &status).await? {
    Some(row) => Ok(Json(serde_json::to_value(row)?)),
    None => Err(AppError::NotFound("inquiry not found".to_string())),
  }
}

#[derive(Deserialize)]
struct NewNote {
  body: String,
}

async fn api_add_inquiry_note(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Json(new): Json<NewNote>,
) -> Result<Json<serde_json::Value>, AppError> {
  if new.body.trim().is_empty() {
    return Err(AppError::BadRequest("note body is empty".into()));
  }
  let id = parse_id(&id)?;
  let Some(inquiry) = state.backend.get_inquiry(id).await? else {
    return Err(AppError::NotFound("inquiry not found".to_string()));
  };

  let mut metadata = inquiry.metadata;
  review::append_note(&mut metadata, new.body);
  match state.backend.update_inquiry_metadata(id, metadata).await? {
    Some(row) => Ok(Json(serde_json::to_value(row)?)),
    None => Err(AppError::NotFound("inquiry not found".to_string())),
  }
}

async fn api_delete_inquiry(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  if state.backend.delete_inquiry(id).await? {
    tracing::info!(id = %id, "inquiry deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
  } else {
    Err(AppError::NotFound("inquiry not found".to_string()))
  }
}

// =============================================================================
// Client profiles
// =============================================================================

async fn api_list_profiles(
  State(state): State<AppState>,
  Query(filter): Query<ProfileFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
  let rows = state.backend.list_profiles().await?;
  let filtered = filter_profiles(&rows, &filter);
  Ok(Json(serde_json::to_value(filtered)?))
}

async fn api_export_profiles(
  State(state): State<AppState>,
  Query(filter): Query<ProfileFilter>,
) -> Result<Response, AppError> {
  let rows = state.backend.list_profiles().await?;
  let filtered = filter_profiles(&rows, &filter);
  Ok(csv_download(profiles_to_csv(&filtered), "profiles.csv"))
}

async fn api_get_profile(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  match state.backend.get_profile(id).await? {
    Some(row) => Ok(Json(serde_json::to_value(row)?)),
    None => Err(AppError::NotFound("profile not found".to_string())),
  }
}

async fn api_update_profile_status(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Json(update): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  let status = RecordStatus::new(update.status);
  match state.backend.update_profile_status(id, &status).await? {
    Some(row) => Ok(Json(serde_json::to_value(row)?)),
    None => Err(AppError::NotFound("profile not found".to_string())),
  }
}

async fn api_delete_profile(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
  let id = parse_id(&id)?;
  if state.backend.delete_profile(id).await? {
    Ok(Json(serde_json::json!({ "deleted": true })))
  } else {
    Err(AppError::NotFound("profile not found".to_string()))
  }
}

// =============================================================================
// Dashboard
// =============================================================================

async fn api_dashboard(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
  let inquiries = state.backend.list_inquiries().await?;
  let summary = summarize_inquiries(&inquiries);
  let recent: Vec<_> = inquiries.into_iter().take(5).collect();
  let content_keys = state.backend.list_content_keys().await?;

  Ok(Json(serde_json::json!({
    "inquiries": summary,
    "recent_inquiries": recent,
    "content_keys": content_keys,
  })))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Serialize)]
struct AuthStatusResponse {
  auth_enabled: bool,
  needs_setup: bool,
  user: Option<UserResponse>,
}

#[derive(Serialize)]
struct UserResponse {
  id: Uuid,
  email: String,
}

impl From<AdminUser> for UserResponse {
  fn from(u: AdminUser) -> Self {
    Self {
      id: u.id,
      email: u.email,
    }
  }
}

async fn api_auth_status(
  State(state): State<AppState>,
  headers: HeaderMap,
) -> Result<Json<AuthStatusResponse>, AppError> {
  let needs_setup = state.backend.count_admin_users().await? == 0;

  let mut user = None;
  if let Some(token) = extract_bearer(&headers) {
    if let Some(hash) = auth::presented_token_hash(&token) {
      if let Some((_, u)) = state.backend.validate_admin_session(&hash).await? {
        user = Some(u.into());
      }
    }
  }

  Ok(Json(AuthStatusResponse {
    auth_enabled: state.config.auth.enabled,
    needs_setup,
    user,
  }))
}

#[derive(Deserialize)]
struct Credentials {
  email: String,
  password: String,
}

#[derive(Serialize)]
struct LoginResponse {
  token: String,
  user: UserResponse,
}

/// First-run bootstrap: creates the initial admin user. Refused once any
/// user exists.
async fn api_auth_setup(
  State(state): State<AppState>,
  Json(creds): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
  if state.backend.count_admin_users().await? > 0 {
    return Err(AppError::Forbidden("setup already completed".to_string()));
  }
  if creds.password.len() < 8 {
    return Err(AppError::BadRequest(
      "password must be at least 8 characters".to_string(),
    ));
  }

  let hash = auth::hash_password(&creds.password)
    .map_err(|e| AppError::Internal(anyhow::anyhow!("password hash failed: {e}")))?;
  let user = state.backend.create_admin_user(&creds.email, &hash).await?;
  let token = start_session(&state, &user).await?;
  Ok(Json(LoginResponse {
    token,
    user: user.into(),
  }))
}

async fn api_auth_login(
  State(state): State<AppState>,
  Json(creds): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
  let user = state
    .backend
    .get_admin_user_by_email(&creds.email)
    .await?
    .filter(|u| auth::verify_password(&creds.password, &u.password_hash))
    .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

  let token = start_session(&state, &user).await?;
  tracing::info!(email = %user.email, "admin login");
  Ok(Json(LoginResponse {
    token,
    user: user.into(),
  }))
}

async fn api_auth_logout(
  State(state): State<AppState>,
  headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
  if let Some(token) = extract_bearer(&headers) {
    if let Some(hash) = auth::presented_token_hash(&token) {
      if let Some((session, _)) = state.backend.validate_admin_session(&hash).await? {
        state.backend.delete_admin_session(session.id).await?;
      }
    }
  }
  Ok(Json(serde_json::json!({ "ok": true })))
}

async fn start_session(state: &AppState, user: &AdminUser) -> Result<String, AppError> {
  let (token, hash) = auth::issue_session_token();
  let expires_at = chrono::Utc::now() + chrono::Duration::hours(state.config.auth.session_ttl_hours);
  state
    .backend
    .create_admin_session(user.id, &hash, expires_at)
    .await?;
  Ok(token)
}

/// Session gate for the protected routes. Passes through when auth is
/// disabled (local development).
async fn session_auth_middleware(
  State(state): State<AppState>,
  req: Request,
  next: Next,
) -> Response {
  if !state.config.auth.enabled {
    return next.run(req).await;
  }

  if let Some(token) = extract_bearer(req.headers()) {
    if let Some(hash) = auth::presented_token_hash(&token) {
      if let Ok(Some(_)) = state.backend.validate_admin_session(&hash).await {
        return next.run(req).await;
      }
    }
  }

  (
    StatusCode::UNAUTHORIZED,
    Json(serde_json::json!({"error": "Authentication required"})),
  )
    .into_response()
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .map(|s| s.to_string())
}

// =============================================================================
// Helpers & error handling
// =============================================================================

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
  raw
    .parse()
    .map_err(|_| AppError::BadRequest("Invalid UUID".into()))
}

fn csv_download(csv: String, filename: &str) -> Response {
  (
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\""),
      ),
    ],
    csv,
  )
    .into_response()
}

pub enum AppError {
  Internal(anyhow::Error),
  NotFound(String),
  BadRequest(String),
  Unauthorized(String),
  Forbidden(String),
}

impl From<anyhow::Error> for AppError {
  fn from(e: anyhow::Error) -> Self {
    Self::Internal(e)
  }
}

impl From<serde_json::Error> for AppError {
  fn from(e: serde_json::Error) -> Self {
    Self::Internal(e.into())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let (status, msg) = match self {
      Self::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
      Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
      Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
      Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
    };
    (status, Json(serde_json::json!({ "error": msg }))).into_response()
  }
}
