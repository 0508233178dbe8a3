//! First-run setup and login flow against the SQLite backend.

use atlascms::db::{DatabaseBackend, SqliteBackend};
use atlascms::server::auth;

#[tokio::test]
async fn test_setup_then_login_flow() {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();

  // Fresh install: no users, setup allowed
  assert_eq!(backend.count_admin_users().await.unwrap(), 0);

  let hash = auth::hash_password("correct horse battery").unwrap();
  let user = backend
    .create_admin_user("partner@fund.example", &hash)
    .await
    .unwrap();

  // Login: look up by email, verify the password
  let found = backend
    .get_admin_user_by_email("partner@fund.example")
    .await
    .unwrap()
    .unwrap();
  assert!(auth::verify_password("correct horse battery", &found.password_hash));
  assert!(!auth::verify_password("wrong", &found.password_hash));

  // Issue a session; only the hash is stored
  let (token, token_hash) = auth::issue_session_token();
  let expires = chrono::Utc::now() + chrono::Duration::hours(1);
  backend
    .create_admin_session(user.id, &token_hash, expires)
    .await
    .unwrap();

  // The bearer token is useless to the store; only its hash validates
  assert!(backend
    .validate_admin_session(&token)
    .await
    .unwrap()
    .is_none());
  let hash = auth::presented_token_hash(&token).unwrap();
  assert_eq!(hash, token_hash);
  let (_, session_user) = backend
    .validate_admin_session(&hash)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(session_user.id, user.id);
}

#[tokio::test]
async fn test_duplicate_admin_email_rejected() {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();

  backend
    .create_admin_user("partner@fund.example", "hash-a")
    .await
    .unwrap();
  let dup = backend
    .create_admin_user("partner@fund.example", "hash-b")
    .await;
  assert!(dup.is_err());
  assert_eq!(backend.count_admin_users().await.unwrap(), 1);
}
