//! Triage logic for externally-submitted records.
//!
//! Filtering happens in memory over the full (small) record set, mirroring
//! the list views: a substring search across a fixed set of fields plus
//! exact-match status/type filters. Notes are append-only entries inside the
//! record's metadata document.

mod csv;

pub use csv::{profiles_to_csv, inquiries_to_csv};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{ClientProfile, Inquiry, RecordStatus};

/// Filter over the inquiry list. All present criteria must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryFilter {
  /// Case-insensitive substring match across name, email, and subject.
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub inquiry_type: Option<String>,
}

impl InquiryFilter {
  pub fn matches(&self, inquiry: &Inquiry) -> bool {
    if let Some(status) = &self.status {
      if inquiry.status.as_str() != status {
        return false;
      }
    }
    if let Some(kind) = &self.inquiry_type {
      if &inquiry.inquiry_type != kind {
        return false;
      }
    }
    if let Some(needle) = &self.search {
      let needle = needle.to_lowercase();
      if !needle.is_empty() {
        let subject = inquiry.subject.as_deref().unwrap_or("");
        let haystacks = [inquiry.name.as_str(), inquiry.email.as_str(), subject];
        if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
          return false;
        }
      }
    }
    true
  }
}

/// Applies `filter`, preserving the incoming (newest-first) order.
pub fn filter_inquiries(inquiries: &[Inquiry], filter: &InquiryFilter) -> Vec<Inquiry> {
  inquiries
    .iter()
    .filter(|i| filter.matches(i))
    .cloned()
    .collect()
}

/// Filter over client profiles: substring across name/email/firm, exact
/// status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFilter {
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
}

impl ProfileFilter {
  pub fn matches(&self, profile: &ClientProfile) -> bool {
    if let Some(status) = &self.status {
      if profile.status.as_str() != status {
        return false;
      }
    }
    if let Some(needle) = &self.search {
      let needle = needle.to_lowercase();
      if !needle.is_empty() {
        let firm = profile.firm.as_deref().unwrap_or("");
        let haystacks = [profile.name.as_str(), profile.email.as_str(), firm];
        if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
          return false;
        }
      }
    }
    true
  }
}

pub fn filter_profiles(profiles: &[ClientProfile], filter: &ProfileFilter) -> Vec<ClientProfile> {
  profiles
    .iter()
    .filter(|p| filter.matches(p))
    .cloned()
    .collect()
}

/// A timestamped triage note. Notes can be added but never edited or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
  pub id: Uuid,
  pub body: String,
  pub created_at: DateTime<Utc>,
}

/// Appends a note to `metadata["notes"]`, creating the array as needed.
/// Non-object metadata is replaced with a fresh object first.
pub fn append_note(metadata: &mut Value, body: impl Into<String>) -> Note {
  let note = Note {
    id: Uuid::new_v4(),
    body: body.into(),
    created_at: Utc::now(),
  };

  if !metadata.is_object() {
    *metadata = serde_json::json!({});
  }
  let obj = metadata.as_object_mut().unwrap();
  let notes = obj
    .entry("notes")
    .or_insert_with(|| Value::Array(Vec::new()));
  if !notes.is_array() {
    *notes = Value::Array(Vec::new());
  }
  notes
    .as_array_mut()
    .unwrap()
    .push(serde_json::to_value(&note).unwrap_or(Value::Null));

  note
}

/// Parses the notes out of a metadata document. Malformed entries are
/// skipped.
pub fn notes(metadata: &Value) -> Vec<Note> {
  metadata
    .get("notes")
    .and_then(Value::as_array)
    .map(|arr| {
      arr
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
    })
    .unwrap_or_default()
}

/// Dashboard roll-up over the inquiry list.
#[derive(Debug, Clone, Serialize)]
pub struct InquirySummary {
  pub total: usize,
  pub new: usize,
  pub in_review: usize,
  pub responded: usize,
  pub archived: usize,
  pub other: usize,
}

pub fn summarize_inquiries(inquiries: &[Inquiry]) -> InquirySummary {
  let mut summary = InquirySummary {
    total: inquiries.len(),
    new: 0,
    in_review: 0,
    responded: 0,
    archived: 0,
    other: 0,
  };
  for inquiry in inquiries {
    match inquiry.status.as_str() {
      RecordStatus::NEW => summary.new += 1,
      RecordStatus::IN_REVIEW => summary.in_review += 1,
      RecordStatus::RESPONDED => summary.responded += 1,
      RecordStatus::ARCHIVED => summary.archived += 1,
      _ => summary.other += 1,
    }
  }
  summary
}
