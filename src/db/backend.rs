use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{
  AdminSession, AdminUser, ClientProfile, ContentEntry, Inquiry, NewInquiry, NewProfile,
  RecordStatus,
};

/// The key-value content store surface.
///
/// Split out of [`DatabaseBackend`] so the content sync binding depends only
/// on the two operations it actually performs.
#[async_trait]
pub trait ContentStore: Send + Sync {
  /// Point lookup by key. `None` when no document has been saved yet.
  async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, anyhow::Error>;

  /// Full-document replacement, creating the entry on first save.
  async fn upsert_content(
    &self,
    key: &str,
    content: serde_json::Value,
  ) -> Result<ContentEntry, anyhow::Error>;

  async fn list_content_keys(&self) -> Result<Vec<String>, anyhow::Error>;
}

/// Abstract persistence backend: the key-value content store, the relational
/// record tables behind the review views, and admin users/sessions.
#[async_trait]
pub trait DatabaseBackend: ContentStore {
  /// Create tables and indexes. Idempotent.
  async fn init_schema(&self) -> Result<(), anyhow::Error>;

  // ===========================================================================
  // Inquiries
  // ===========================================================================

  async fn insert_inquiry(&self, new: NewInquiry) -> Result<Inquiry, anyhow::Error>;

  /// All inquiries, newest first.
  async fn list_inquiries(&self) -> Result<Vec<Inquiry>, anyhow::Error>;

  async fn get_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, anyhow::Error>;

  /// Single-field status update. Returns the updated row, `None` if absent.
  async fn update_inquiry_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<Inquiry>, anyhow::Error>;

  /// Replace the metadata document (notes live inside it).
  async fn update_inquiry_metadata(
    &self,
    id: Uuid,
    metadata: serde_json::Value,
  ) -> Result<Option<Inquiry>, anyhow::Error>;

  async fn delete_inquiry(&self, id: Uuid) -> Result<bool, anyhow::Error>;

  // ===========================================================================
  // Client profiles
  // ===========================================================================

  async fn insert_profile(&self, new: NewProfile) -> Result<ClientProfile, anyhow::Error>;

  /// All profiles, newest first.
  async fn list_profiles(&self) -> Result<Vec<ClientProfile>, anyhow::Error>;

  async fn get_profile(&self, id: Uuid) -> Result<Option<ClientProfile>, anyhow::Error>;

  async fn update_profile_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<ClientProfile>, anyhow::Error>;

  async fn delete_profile(&self, id: Uuid) -> Result<bool, anyhow::Error>;

  // ===========================================================================
  // Admin users & sessions
  // ===========================================================================

  async fn count_admin_users(&self) -> Result<u64, anyhow::Error>;

  async fn create_admin_user(
    &self,
    email: &str,
    password_hash: &str,
  ) -> Result<AdminUser, anyhow::Error>;

  async fn get_admin_user_by_email(&self, email: &str)
    -> Result<Option<AdminUser>, anyhow::Error>;

  async fn create_admin_session(
    &self,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<AdminSession, anyhow::Error>;

  /// Resolve a session token hash to a live (non-expired) session and its
  /// user.
  async fn validate_admin_session(
    &self,
    token_hash: &str,
  ) -> Result<Option<(AdminSession, AdminUser)>, anyhow::Error>;

  async fn delete_admin_session(&self, id: Uuid) -> Result<(), anyhow::Error>;
}
