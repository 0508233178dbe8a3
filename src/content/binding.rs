use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::db::ContentStore;
use crate::types::ContentEntry;

/// Where the binding's current document came from.
///
/// A failed fetch is deliberately distinct from "nothing stored yet": the
/// editor still gets the default document to work with (fail-open), but the
/// caller can tell the user they may be looking at defaults rather than the
/// live content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrigin {
  /// The stored document for this key.
  Stored,
  /// No document stored yet; the caller-supplied default.
  Default,
  /// The fetch errored; the caller-supplied default stands in.
  FetchFailed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
  /// Skip the fetch entirely and start from the default document. Used by
  /// editors that intentionally avoid the round-trip.
  pub skip_fetch: bool,
}

/// Load/edit/save lifecycle for one content key.
///
/// A save is a full replacement of the stored document. When an editor loads
/// several keys and saves them together, merging fields it did not intend to
/// overwrite is the caller's responsibility, not a guarantee of this type.
pub struct ContentBinding<S: ContentStore + ?Sized> {
  store: Arc<S>,
  key: String,
  document: Value,
  origin: DocumentOrigin,
  saving: bool,
}

impl<S: ContentStore + ?Sized> ContentBinding<S> {
  /// Constructs the binding, fetching the stored document unless
  /// `opts.skip_fetch` is set.
  ///
  /// Fetch errors never block the editor: the binding falls back to
  /// `default` and records `DocumentOrigin::FetchFailed`.
  pub async fn load(store: Arc<S>, key: impl Into<String>, default: Value, opts: LoadOptions) -> Self {
    let key = key.into();

    if opts.skip_fetch {
      return Self {
        store,
        key,
        document: default,
        origin: DocumentOrigin::Default,
        saving: false,
      };
    }

    let (document, origin) = match store.get_content(&key).await {
      Ok(Some(entry)) => (entry.content, DocumentOrigin::Stored),
      Ok(None) => (default, DocumentOrigin::Default),
      Err(e) => {
        tracing::warn!(key = %key, "content fetch failed, editing defaults: {e}");
        (default, DocumentOrigin::FetchFailed)
      }
    };

    Self {
      store,
      key,
      document,
      origin,
      saving: false,
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn document(&self) -> &Value {
    &self.document
  }

  pub fn origin(&self) -> DocumentOrigin {
    self.origin
  }

  pub fn is_saving(&self) -> bool {
    self.saving
  }

  /// Replaces the in-memory document without persisting.
  pub fn replace(&mut self, new_document: Value) {
    self.document = new_document;
  }

  /// Shallow-merges `partial` into the in-memory document without
  /// persisting. Top-level keys of `partial` overwrite existing keys
  /// (including with `null`); nested objects are replaced, not merged.
  /// If either side is not an object the document is replaced wholesale.
  pub fn merge_patch(&mut self, partial: Value) {
    match (&mut self.document, partial) {
      (Value::Object(doc), Value::Object(patch)) => {
        for (k, v) in patch {
          doc.insert(k, v);
        }
      }
      (_, partial) => self.document = partial,
    }
  }

  /// Persists the current in-memory document.
  pub async fn save(&mut self) -> Result<ContentEntry, anyhow::Error> {
    let doc = self.document.clone();
    self.save_document(doc).await
  }

  /// Persists `document` as a full replacement for this key. On success the
  /// in-memory document becomes the saved value; on failure it is left
  /// untouched so unsaved edits survive for a retry. The saving flag is
  /// cleared on both paths.
  pub async fn save_document(&mut self, document: Value) -> Result<ContentEntry, anyhow::Error> {
    self.saving = true;
    let result = self.store.upsert_content(&self.key, document).await;
    self.saving = false;

    let entry = result?;
    self.document = entry.content.clone();
    self.origin = DocumentOrigin::Stored;
    Ok(entry)
  }
}
