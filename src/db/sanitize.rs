//! Content key validation.
//!
//! Keys partition the content store and end up inside SQL statements only as
//! bind parameters, but they are also path segments in the admin API, so the
//! accepted alphabet is kept deliberately narrow.

use thiserror::Error;

/// Maximum length for content keys.
pub const MAX_KEY_LENGTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
  #[error("content key is empty")]
  Empty,
  #[error("content key too long: {0} chars (max {MAX_KEY_LENGTH})")]
  TooLong(usize),
  #[error("content key must start with a lowercase letter, got '{0}'")]
  InvalidStart(char),
  #[error("invalid character in content key: '{0}'")]
  InvalidChar(char),
}

/// Validates a content key: lowercase alphanumeric plus `_` and `-`, starting
/// with a letter.
pub fn validate_content_key(key: &str) -> Result<(), KeyError> {
  if key.is_empty() {
    return Err(KeyError::Empty);
  }
  if key.len() > MAX_KEY_LENGTH {
    return Err(KeyError::TooLong(key.len()));
  }

  let first = key.chars().next().unwrap();
  if !first.is_ascii_lowercase() {
    return Err(KeyError::InvalidStart(first));
  }

  for c in key.chars() {
    if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_' && c != '-' {
      return Err(KeyError::InvalidChar(c));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_page_keys() {
    for key in ["home", "footer", "navigation", "board", "news-archive", "careers_2024"] {
      assert_eq!(validate_content_key(key), Ok(()), "{key}");
    }
  }

  #[test]
  fn rejects_bad_keys() {
    assert_eq!(validate_content_key(""), Err(KeyError::Empty));
    assert_eq!(validate_content_key("9lives"), Err(KeyError::InvalidStart('9')));
    assert_eq!(validate_content_key("Home"), Err(KeyError::InvalidStart('H')));
    assert_eq!(
      validate_content_key("home page"),
      Err(KeyError::InvalidChar(' '))
    );
    assert_eq!(
      validate_content_key("home'; drop"),
      Err(KeyError::InvalidChar('\''))
    );
    let long = "k".repeat(MAX_KEY_LENGTH + 1);
    assert_eq!(validate_content_key(&long), Err(KeyError::TooLong(65)));
  }
}
