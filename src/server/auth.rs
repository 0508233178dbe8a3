//! Credential handling for the admin panel.
//!
//! Passwords are stored as argon2id hashes. Session tokens are opaque bearer
//! tokens handed to the panel with a `session_` prefix; the sessions table
//! only ever sees their SHA-256 hash, so a leaked row cannot be replayed as
//! a login.

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand::Rng;
use sha2::{Digest, Sha256};

const SESSION_TOKEN_PREFIX: &str = "session_";

/// Argon2id hash of an admin password, with a fresh per-password salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
  Ok(hash.to_string())
}

/// Checks a login attempt against a stored hash. Unparseable hashes fail
/// closed.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Mints a session token: `(bearer_token, storage_hash)`. The bearer form
/// goes to the client, the hash into the sessions table.
pub fn issue_session_token() -> (String, String) {
  let raw: [u8; 32] = rand::thread_rng().gen();
  let raw = hex::encode(raw);
  let hash = sha256_hex(&raw);
  (format!("{SESSION_TOKEN_PREFIX}{raw}"), hash)
}

/// Maps a presented bearer token back to its storage hash. `None` when the
/// token is not in the issued form, so raw or foreign tokens never reach the
/// session lookup.
pub fn presented_token_hash(token: &str) -> Option<String> {
  token.strip_prefix(SESSION_TOKEN_PREFIX).map(sha256_hex)
}

fn sha256_hex(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_verification_rejects_near_misses() {
    let hash = hash_password("atlas partners 2024").unwrap();
    assert!(verify_password("atlas partners 2024", &hash));
    assert!(!verify_password("atlas partners 2024 ", &hash));
    assert!(!verify_password("atlas partners 2024", "not-an-argon2-hash"));
  }

  #[test]
  fn issued_tokens_round_trip_to_their_stored_hash() {
    let (token, stored) = issue_session_token();
    assert!(token.starts_with(SESSION_TOKEN_PREFIX));
    assert_eq!(presented_token_hash(&token).as_deref(), Some(stored.as_str()));
  }

  #[test]
  fn raw_or_unprefixed_tokens_are_rejected() {
    let (token, stored) = issue_session_token();
    let raw = token.strip_prefix(SESSION_TOKEN_PREFIX).unwrap();
    assert!(presented_token_hash(raw).is_none());
    // the stored hash itself is not a usable bearer token either
    assert!(presented_token_hash(&stored).is_none());
  }

  #[test]
  fn tokens_are_unique_per_issue() {
    let (a, _) = issue_session_token();
    let (b, _) = issue_session_token();
    assert_ne!(a, b);
  }
}
