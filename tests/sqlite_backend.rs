use atlascms::db::{ContentStore, DatabaseBackend, SqliteBackend};
use atlascms::types::{NewInquiry, NewProfile, RecordStatus};
use serde_json::json;

async fn backend() -> SqliteBackend {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();
  backend
}

fn new_inquiry(name: &str, email: &str) -> NewInquiry {
  NewInquiry {
    name: name.to_string(),
    email: email.to_string(),
    company: None,
    inquiry_type: "general".to_string(),
    subject: Some("hello".to_string()),
    message: "message body".to_string(),
  }
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
  let backend = backend().await;
  // Should not fail on re-init
  backend.init_schema().await.unwrap();
}

#[tokio::test]
async fn test_file_backed_store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cms.db");
  let path = path.to_str().unwrap();

  {
    let backend = SqliteBackend::new(path).await.unwrap();
    backend.init_schema().await.unwrap();
    backend
      .upsert_content("home", json!({"hero": {"title": "Persisted"}}))
      .await
      .unwrap();
  }

  let reopened = SqliteBackend::new(path).await.unwrap();
  reopened.init_schema().await.unwrap();
  let entry = reopened.get_content("home").await.unwrap().unwrap();
  assert_eq!(entry.content["hero"]["title"], "Persisted");
}

// =============================================================================
// Content store
// =============================================================================

#[tokio::test]
async fn test_content_get_missing_returns_none() {
  let backend = backend().await;
  assert!(backend.get_content("home").await.unwrap().is_none());
}

#[tokio::test]
async fn test_content_upsert_and_get() {
  let backend = backend().await;

  let doc = json!({"hero": {"title": "Welcome"}});
  let saved = backend.upsert_content("home", doc.clone()).await.unwrap();
  assert_eq!(saved.key, "home");
  assert_eq!(saved.content, doc);

  let fetched = backend.get_content("home").await.unwrap().unwrap();
  assert_eq!(fetched.content, doc);
}

#[tokio::test]
async fn test_content_upsert_replaces_whole_document() {
  let backend = backend().await;

  backend
    .upsert_content("footer", json!({"links": [1, 2], "legal": "x"}))
    .await
    .unwrap();
  backend
    .upsert_content("footer", json!({"links": []}))
    .await
    .unwrap();

  let fetched = backend.get_content("footer").await.unwrap().unwrap();
  // Full replacement: the dropped field does not linger
  assert_eq!(fetched.content, json!({"links": []}));
}

#[tokio::test]
async fn test_content_rejects_invalid_keys() {
  let backend = backend().await;
  assert!(backend.get_content("").await.is_err());
  assert!(backend.get_content("Home Page").await.is_err());
  assert!(backend
    .upsert_content("../etc", json!({}))
    .await
    .is_err());
}

#[tokio::test]
async fn test_content_list_keys_sorted() {
  let backend = backend().await;
  backend.upsert_content("navigation", json!({})).await.unwrap();
  backend.upsert_content("board", json!({})).await.unwrap();
  backend.upsert_content("home", json!({})).await.unwrap();

  let keys = backend.list_content_keys().await.unwrap();
  assert_eq!(keys, vec!["board", "home", "navigation"]);
}

// =============================================================================
// Inquiries
// =============================================================================

#[tokio::test]
async fn test_inquiry_insert_and_get() {
  let backend = backend().await;

  let inquiry = backend
    .insert_inquiry(new_inquiry("Dana", "dana@fund.example"))
    .await
    .unwrap();
  assert_eq!(inquiry.status.as_str(), RecordStatus::NEW);

  let fetched = backend.get_inquiry(inquiry.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Dana");
  assert_eq!(fetched.email, "dana@fund.example");
  assert_eq!(fetched.metadata, json!({}));
}

#[tokio::test]
async fn test_inquiry_list_newest_first() {
  let backend = backend().await;
  backend
    .insert_inquiry(new_inquiry("First", "a@x.example"))
    .await
    .unwrap();
  backend
    .insert_inquiry(new_inquiry("Second", "b@x.example"))
    .await
    .unwrap();

  let rows = backend.list_inquiries().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].name, "Second");
  assert_eq!(rows[1].name, "First");
}

#[tokio::test]
async fn test_inquiry_status_update() {
  let backend = backend().await;
  let inquiry = backend
    .insert_inquiry(new_inquiry("Dana", "dana@fund.example"))
    .await
    .unwrap();

  let updated = backend
    .update_inquiry_status(inquiry.id, &RecordStatus::new("in_review"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status.as_str(), "in_review");
  // Only the status changed
  assert_eq!(updated.name, "Dana");

  let missing = backend
    .update_inquiry_status(uuid::Uuid::new_v4(), &RecordStatus::new("archived"))
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn test_inquiry_metadata_update_roundtrips_notes() {
  let backend = backend().await;
  let inquiry = backend
    .insert_inquiry(new_inquiry("Dana", "dana@fund.example"))
    .await
    .unwrap();

  let mut metadata = inquiry.metadata;
  atlascms::review::append_note(&mut metadata, "called back");
  backend
    .update_inquiry_metadata(inquiry.id, metadata)
    .await
    .unwrap()
    .unwrap();

  let fetched = backend.get_inquiry(inquiry.id).await.unwrap().unwrap();
  let notes = atlascms::review::notes(&fetched.metadata);
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].body, "called back");
}

#[tokio::test]
async fn test_inquiry_delete() {
  let backend = backend().await;
  let inquiry = backend
    .insert_inquiry(new_inquiry("Dana", "dana@fund.example"))
    .await
    .unwrap();

  assert!(backend.delete_inquiry(inquiry.id).await.unwrap());
  assert!(!backend.delete_inquiry(inquiry.id).await.unwrap());
  assert!(backend.get_inquiry(inquiry.id).await.unwrap().is_none());
}

// =============================================================================
// Client profiles
// =============================================================================

#[tokio::test]
async fn test_profile_lifecycle() {
  let backend = backend().await;

  let profile = backend
    .insert_profile(NewProfile {
      name: "Alex Kim".to_string(),
      email: "alex@lp.example".to_string(),
      firm: Some("Cedar Capital".to_string()),
    })
    .await
    .unwrap();
  assert_eq!(profile.status.as_str(), RecordStatus::NEW);

  let updated = backend
    .update_profile_status(profile.id, &RecordStatus::new("archived"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status.as_str(), "archived");
  assert_eq!(updated.firm.as_deref(), Some("Cedar Capital"));

  assert!(backend.delete_profile(profile.id).await.unwrap());
  assert!(backend.get_profile(profile.id).await.unwrap().is_none());
}

// =============================================================================
// Admin users & sessions
// =============================================================================

#[tokio::test]
async fn test_admin_user_and_session_flow() {
  let backend = backend().await;
  assert_eq!(backend.count_admin_users().await.unwrap(), 0);

  let user = backend
    .create_admin_user("admin@fund.example", "argon2-hash-here")
    .await
    .unwrap();
  assert_eq!(backend.count_admin_users().await.unwrap(), 1);

  let found = backend
    .get_admin_user_by_email("admin@fund.example")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.id, user.id);
  assert_eq!(found.password_hash, "argon2-hash-here");

  let expires = chrono::Utc::now() + chrono::Duration::hours(1);
  let session = backend
    .create_admin_session(user.id, "token-hash", expires)
    .await
    .unwrap();

  let (validated, validated_user) = backend
    .validate_admin_session("token-hash")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(validated.id, session.id);
  assert_eq!(validated_user.email, "admin@fund.example");

  assert!(backend
    .validate_admin_session("wrong-hash")
    .await
    .unwrap()
    .is_none());

  backend.delete_admin_session(session.id).await.unwrap();
  assert!(backend
    .validate_admin_session("token-hash")
    .await
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
  let backend = backend().await;
  let user = backend
    .create_admin_user("admin@fund.example", "hash")
    .await
    .unwrap();

  let expired = chrono::Utc::now() - chrono::Duration::minutes(1);
  backend
    .create_admin_session(user.id, "stale-hash", expired)
    .await
    .unwrap();

  assert!(backend
    .validate_admin_session("stale-hash")
    .await
    .unwrap()
    .is_none());
}
