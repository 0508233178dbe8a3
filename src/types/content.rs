use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored content document.
///
/// At most one entry exists per key. A save is always a full replacement of
/// the previous document for that key; there are no partial-patch semantics
/// at the store level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
  pub key: String,
  pub content: serde_json::Value,
  pub updated_at: DateTime<Utc>,
}
