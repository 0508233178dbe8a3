//! Editing operations for repeatable items inside a content document.
//!
//! Every editor page with repeatable rows (directors, partners, quick links,
//! articles, jobs) stores them as a JSON array of objects carrying a string
//! `"id"` field. These functions are the add/update/delete/reorder contract
//! those pages share.

use serde_json::{Map, Value};
use uuid::Uuid;

/// Appends `template` to the array with a freshly generated `"id"`, returning
/// the new element's id. Non-object templates are wrapped as `{"id": ...}`
/// plus nothing else, which callers have no reason to do but must not corrupt
/// the array.
pub fn add(array: &mut Vec<Value>, template: Value) -> String {
  let id = Uuid::new_v4().to_string();
  let mut obj = match template {
    Value::Object(m) => m,
    _ => Map::new(),
  };
  obj.insert("id".to_string(), Value::String(id.clone()));
  array.push(Value::Object(obj));
  id
}

/// Shallow-merges `patch` into the element whose `"id"` equals `id`.
/// No-op when no element matches. Returns whether an element was updated.
pub fn update(array: &mut [Value], id: &str, patch: Value) -> bool {
  let Value::Object(patch) = patch else {
    return false;
  };
  let Some(element) = array.iter_mut().find(|e| element_id(e) == Some(id)) else {
    return false;
  };
  if let Value::Object(obj) = element {
    for (k, v) in patch {
      obj.insert(k, v);
    }
  }
  true
}

/// Removes the element whose `"id"` equals `id`. Idempotent: removing an
/// absent id leaves the array unchanged and returns `false`.
pub fn remove(array: &mut Vec<Value>, id: &str) -> bool {
  let before = array.len();
  array.retain(|e| element_id(e) != Some(id));
  array.len() != before
}

/// Moves the element at `from` to position `to`, preserving the relative
/// order of all other elements (a stable index move, not a sort).
///
/// `from == to` is a no-op. An out-of-range `from` is rejected (no-op,
/// returns `false`); `to` is clamped to the end of the array.
pub fn reorder(array: &mut Vec<Value>, from: usize, to: usize) -> bool {
  if from >= array.len() {
    return false;
  }
  let to = to.min(array.len() - 1);
  if from == to {
    return true;
  }
  let element = array.remove(from);
  array.insert(to, element);
  true
}

fn element_id(element: &Value) -> Option<&str> {
  element.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn links() -> Vec<Value> {
    vec![
      json!({"id": "a", "label": "Team"}),
      json!({"id": "b", "label": "Portfolio"}),
      json!({"id": "c", "label": "News"}),
    ]
  }

  #[test]
  fn add_assigns_fresh_id() {
    let mut arr = links();
    let id = add(&mut arr, json!({"label": "Careers"}));
    assert_eq!(arr.len(), 4);
    assert_eq!(arr[3]["label"], "Careers");
    assert_eq!(arr[3]["id"], Value::String(id));
  }

  #[test]
  fn update_merges_matching_element() {
    let mut arr = links();
    assert!(update(&mut arr, "b", json!({"label": "Companies", "href": "/companies"})));
    assert_eq!(arr[1], json!({"id": "b", "label": "Companies", "href": "/companies"}));
  }

  #[test]
  fn update_missing_id_is_noop() {
    let mut arr = links();
    assert!(!update(&mut arr, "zz", json!({"label": "X"})));
    assert_eq!(arr, links());
  }

  #[test]
  fn remove_missing_id_is_noop() {
    let mut arr = links();
    assert!(!remove(&mut arr, "zz"));
    assert_eq!(arr, links());
  }

  #[test]
  fn reorder_moves_exactly_one_element() {
    let mut arr = links();
    assert!(reorder(&mut arr, 2, 0));
    let ids: Vec<_> = arr.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
  }

  #[test]
  fn reorder_same_index_is_noop() {
    let mut arr = links();
    assert!(reorder(&mut arr, 1, 1));
    assert_eq!(arr, links());
  }

  #[test]
  fn reorder_clamps_destination() {
    let mut arr = links();
    assert!(reorder(&mut arr, 0, 99));
    let ids: Vec<_> = arr.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["b", "c", "a"]);
  }

  #[test]
  fn reorder_rejects_out_of_range_source() {
    let mut arr = links();
    assert!(!reorder(&mut arr, 7, 0));
    assert_eq!(arr, links());
  }
}
