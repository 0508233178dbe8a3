use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review status of a relational record.
///
/// Statuses are an open, admin-defined set: any value may follow any value,
/// so this is a string newtype with well-known constants rather than a closed
/// enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStatus(String);

impl RecordStatus {
  pub const NEW: &'static str = "new";
  pub const IN_REVIEW: &'static str = "in_review";
  pub const RESPONDED: &'static str = "responded";
  pub const ARCHIVED: &'static str = "archived";

  pub fn new(s: impl Into<String>) -> Self {
    Self(s.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for RecordStatus {
  fn default() -> Self {
    Self(Self::NEW.to_string())
  }
}

impl std::fmt::Display for RecordStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RecordStatus {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

/// An inquiry submitted through the public marketing site.
///
/// The primary key is immutable after creation. `metadata` is a free-form
/// document; triage notes live under `metadata["notes"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub company: Option<String>,
  pub inquiry_type: String,
  pub subject: Option<String>,
  pub message: String,
  pub status: RecordStatus,
  pub metadata: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields for a new inquiry (id, status, and timestamps are assigned by the
/// backend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInquiry {
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub company: Option<String>,
  #[serde(default = "default_inquiry_type")]
  pub inquiry_type: String,
  #[serde(default)]
  pub subject: Option<String>,
  #[serde(default)]
  pub message: String,
}

fn default_inquiry_type() -> String {
  "general".to_string()
}

/// A portfolio-company or LP contact profile, created by the public site and
/// triaged through the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub firm: Option<String>,
  pub status: RecordStatus,
  pub metadata: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields for a new client profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub firm: Option<String>,
}

/// An admin panel user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
}

/// A login session (stored as a hash of the session token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
  pub id: Uuid,
  pub user_id: Uuid,
  pub expires_at: DateTime<Utc>,
}
