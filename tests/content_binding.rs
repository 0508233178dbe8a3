use std::sync::Arc;

use atlascms::content::{
  default_document, list, ContentBinding, ContentKey, DocumentOrigin, LoadOptions,
};
use atlascms::db::{ContentStore, DatabaseBackend, SqliteBackend};
use atlascms::types::ContentEntry;
use serde_json::{json, Value};

async fn store() -> Arc<SqliteBackend> {
  let backend = SqliteBackend::in_memory().await.unwrap();
  backend.init_schema().await.unwrap();
  Arc::new(backend)
}

#[tokio::test]
async fn test_missing_document_falls_back_to_default() {
  let store = store().await;
  let binding = ContentBinding::load(
    store,
    "home",
    json!({"hero": {"title": "Welcome"}}),
    LoadOptions::default(),
  )
  .await;

  assert_eq!(binding.origin(), DocumentOrigin::Default);
  assert_eq!(binding.document(), &json!({"hero": {"title": "Welcome"}}));
  assert!(!binding.is_saving());
}

#[tokio::test]
async fn test_stored_document_wins_over_default() {
  let store = store().await;
  store
    .upsert_content("home", json!({"hero": {"title": "Edited"}}))
    .await
    .unwrap();

  let binding = ContentBinding::load(
    store,
    "home",
    json!({"hero": {"title": "Welcome"}}),
    LoadOptions::default(),
  )
  .await;

  assert_eq!(binding.origin(), DocumentOrigin::Stored);
  assert_eq!(binding.document()["hero"]["title"], "Edited");
}

#[tokio::test]
async fn test_save_then_reload_roundtrip() {
  let store = store().await;

  let mut binding = ContentBinding::load(
    store.clone(),
    "contact",
    default_document(ContentKey::Contact),
    LoadOptions::default(),
  )
  .await;
  binding.merge_patch(json!({"address": "1 Sand Hill Rd"}));
  binding.save().await.unwrap();
  assert_eq!(binding.origin(), DocumentOrigin::Stored);

  let reloaded = ContentBinding::load(
    store,
    "contact",
    json!({}),
    LoadOptions::default(),
  )
  .await;
  assert_eq!(reloaded.origin(), DocumentOrigin::Stored);
  assert_eq!(reloaded.document()["address"], "1 Sand Hill Rd");
}

#[tokio::test]
async fn test_list_edits_survive_save() {
  let store = store().await;
  let mut binding = ContentBinding::load(
    store.clone(),
    "news",
    default_document(ContentKey::News),
    LoadOptions::default(),
  )
  .await;

  let mut doc = binding.document().clone();
  let articles = doc["articles"].as_array_mut().unwrap();
  let before = articles.len();
  let id = list::add(articles, json!({"title": "Fund IV closes", "body": ""}));
  binding.replace(doc);
  binding.save().await.unwrap();

  let reloaded = ContentBinding::load(store, "news", json!({}), LoadOptions::default()).await;
  let articles = reloaded.document()["articles"].as_array().unwrap();
  assert_eq!(articles.len(), before + 1);
  assert!(articles
    .iter()
    .any(|a| a["id"] == Value::String(id.clone())));
}

#[tokio::test]
async fn test_footer_quick_link_add_and_reorder_roundtrip() {
  let store = store().await;
  let mut binding = ContentBinding::load(
    store.clone(),
    "footer",
    default_document(ContentKey::Footer),
    LoadOptions::default(),
  )
  .await;

  let mut doc = binding.document().clone();
  let links = doc["quick_links"].as_array_mut().unwrap();
  assert_eq!(links.len(), 5);

  let id = list::add(links, json!({"label": "Press", "href": "/press"}));
  assert!(list::reorder(links, 5, 0));
  binding.replace(doc);
  binding.save().await.unwrap();

  let reloaded = ContentBinding::load(store, "footer", json!({}), LoadOptions::default()).await;
  let links = reloaded.document()["quick_links"].as_array().unwrap();
  assert_eq!(links.len(), 6);
  assert_eq!(links[0]["id"], Value::String(id));
  assert_eq!(links[0]["label"], "Press");
}

#[tokio::test]
async fn test_fetch_failure_falls_open_to_default() {
  let store = Arc::new(BrokenStore);
  let binding = ContentBinding::load(
    store,
    "home",
    json!({"hero": {"title": "Welcome"}}),
    LoadOptions::default(),
  )
  .await;

  // The editor still opens, on defaults, and records that the load failed
  assert_eq!(binding.origin(), DocumentOrigin::FetchFailed);
  assert_eq!(binding.document(), &json!({"hero": {"title": "Welcome"}}));
}

#[tokio::test]
async fn test_failed_save_keeps_unsaved_edits() {
  let store = Arc::new(BrokenStore);
  let mut binding = ContentBinding::load(
    store,
    "home",
    json!({"hero": {"title": "Welcome"}}),
    LoadOptions { skip_fetch: true },
  )
  .await;

  let result = binding
    .save_document(json!({"hero": {"title": "Edited but unsaved"}}))
    .await;
  assert!(result.is_err());

  // Edits survive for a retry and the binding is not stuck in "saving"
  assert_eq!(binding.document(), &json!({"hero": {"title": "Welcome"}}));
  assert!(!binding.is_saving());
}

/// A store whose every operation fails.
struct BrokenStore;

#[async_trait::async_trait]
impl ContentStore for BrokenStore {
  async fn get_content(&self, _key: &str) -> Result<Option<ContentEntry>, anyhow::Error> {
    anyhow::bail!("connection refused")
  }
  async fn upsert_content(&self, _key: &str, _content: Value) -> Result<ContentEntry, anyhow::Error> {
    anyhow::bail!("connection refused")
  }
  async fn list_content_keys(&self) -> Result<Vec<String>, anyhow::Error> {
    anyhow::bail!("connection refused")
  }
}
