use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::backend::{ContentStore, DatabaseBackend};
use super::sanitize::validate_content_key;
use crate::types::{
  AdminSession, AdminUser, ClientProfile, ContentEntry, Inquiry, NewInquiry, NewProfile,
  RecordStatus,
};

const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -16000;
PRAGMA temp_store = MEMORY;
"#;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS content_entries (
    key TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    updated_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS inquiries (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    company TEXT,
    inquiry_type TEXT NOT NULL DEFAULT 'general',
    subject TEXT,
    message TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'new',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_inquiries_status ON inquiries(status);
CREATE INDEX IF NOT EXISTS idx_inquiries_created ON inquiries(created_at);

CREATE TABLE IF NOT EXISTS client_profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    firm TEXT,
    status TEXT NOT NULL DEFAULT 'new',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_client_profiles_created ON client_profiles(created_at);

CREATE TABLE IF NOT EXISTS admin_users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS admin_sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES admin_users(id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_admin_sessions_token ON admin_sessions(token_hash);
"#;

pub struct SqliteBackend {
  conn: Connection,
}

impl SqliteBackend {
  pub async fn new(path: &str) -> Result<Self, anyhow::Error> {
    let conn = if path == ":memory:" {
      Connection::open_in_memory().await?
    } else {
      Connection::open(path).await?
    };

    // Apply performance pragmas
    conn
      .call(|conn| conn.execute_batch(PRAGMAS).map_err(|e| e.into()))
      .await?;

    Ok(Self { conn })
  }

  pub async fn in_memory() -> Result<Self, anyhow::Error> {
    Self::new(":memory:").await
  }
}

#[async_trait]
impl ContentStore for SqliteBackend {
  async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, anyhow::Error> {
    validate_content_key(key)?;
    let key = key.to_string();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare_cached("SELECT key, content, updated_at FROM content_entries WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
          Ok(Some(row_to_content(row)?))
        } else {
          Ok(None)
        }
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn upsert_content(
    &self,
    key: &str,
    content: serde_json::Value,
  ) -> Result<ContentEntry, anyhow::Error> {
    validate_content_key(key)?;

    let now = Utc::now();
    let content_str = serde_json::to_string(&content)?;
    let now_str = now.to_rfc3339();
    let key_owned = key.to_string();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO content_entries (key, content, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at",
            params![key_owned, content_str, now_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    Ok(ContentEntry {
      key: key.to_string(),
      content,
      updated_at: now,
    })
  }

  async fn list_content_keys(&self) -> Result<Vec<String>, anyhow::Error> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT key FROM content_entries ORDER BY key")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
          keys.push(row.get(0)?);
        }
        Ok(keys)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
  async fn init_schema(&self) -> Result<(), anyhow::Error> {
    self
      .conn
      .call(|conn| conn.execute_batch(SCHEMA).map_err(|e| e.into()))
      .await?;
    tracing::info!("SQLite schema initialized");
    Ok(())
  }

  // ===========================================================================
  // Inquiries
  // ===========================================================================

  async fn insert_inquiry(&self, new: NewInquiry) -> Result<Inquiry, anyhow::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let now_str = now.to_rfc3339();
    let id_str = id.to_string();
    let row = new.clone();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO inquiries (id, name, email, company, inquiry_type, subject, message, status, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'new', '{}', ?8, ?8)",
            params![
              id_str,
              row.name,
              row.email,
              row.company,
              row.inquiry_type,
              row.subject,
              row.message,
              now_str
            ],
          )
          .map_err(|e| e.into())
      })
      .await?;

    Ok(Inquiry {
      id,
      name: new.name,
      email: new.email,
      company: new.company,
      inquiry_type: new.inquiry_type,
      subject: new.subject,
      message: new.message,
      status: RecordStatus::default(),
      metadata: serde_json::json!({}),
      created_at: now,
      updated_at: now,
    })
  }

  async fn list_inquiries(&self) -> Result<Vec<Inquiry>, anyhow::Error> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, email, company, inquiry_type, subject, message, status, metadata, created_at, updated_at
           FROM inquiries ORDER BY created_at DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
          out.push(row_to_inquiry(row)?);
        }
        Ok(out)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn get_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, anyhow::Error> {
    let id_str = id.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, email, company, inquiry_type, subject, message, status, metadata, created_at, updated_at
           FROM inquiries WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id_str])?;
        if let Some(row) = rows.next()? {
          Ok(Some(row_to_inquiry(row)?))
        } else {
          Ok(None)
        }
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn update_inquiry_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<Inquiry>, anyhow::Error> {
    let id_str = id.to_string();
    let status = status.as_str().to_string();
    let now_str = Utc::now().to_rfc3339();

    let changed = self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "UPDATE inquiries SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, now_str, id_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_inquiry(id).await
  }

  async fn update_inquiry_metadata(
    &self,
    id: Uuid,
    metadata: serde_json::Value,
  ) -> Result<Option<Inquiry>, anyhow::Error> {
    let id_str = id.to_string();
    let metadata_str = serde_json::to_string(&metadata)?;
    let now_str = Utc::now().to_rfc3339();

    let changed = self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "UPDATE inquiries SET metadata = ?1, updated_at = ?2 WHERE id = ?3",
            params![metadata_str, now_str, id_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_inquiry(id).await
  }

  async fn delete_inquiry(&self, id: Uuid) -> Result<bool, anyhow::Error> {
    let id_str = id.to_string();
    let changed = self
      .conn
      .call(move |conn| {
        conn
          .execute("DELETE FROM inquiries WHERE id = ?1", params![id_str])
          .map_err(|e| e.into())
      })
      .await?;
    Ok(changed > 0)
  }

  // ===========================================================================
  // Client profiles
  // ===========================================================================

  async fn insert_profile(&self, new: NewProfile) -> Result<ClientProfile, anyhow::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let now_str = now.to_rfc3339();
    let id_str = id.to_string();
    let row = new.clone();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO client_profiles (id, name, email, firm, status, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 'new', '{}', ?5, ?5)",
            params![id_str, row.name, row.email, row.firm, now_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    Ok(ClientProfile {
      id,
      name: new.name,
      email: new.email,
      firm: new.firm,
      status: RecordStatus::default(),
      metadata: serde_json::json!({}),
      created_at: now,
      updated_at: now,
    })
  }

  async fn list_profiles(&self) -> Result<Vec<ClientProfile>, anyhow::Error> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, email, firm, status, metadata, created_at, updated_at
           FROM client_profiles ORDER BY created_at DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
          out.push(row_to_profile(row)?);
        }
        Ok(out)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<ClientProfile>, anyhow::Error> {
    let id_str = id.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, email, firm, status, metadata, created_at, updated_at
           FROM client_profiles WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id_str])?;
        if let Some(row) = rows.next()? {
          Ok(Some(row_to_profile(row)?))
        } else {
          Ok(None)
        }
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn update_profile_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<ClientProfile>, anyhow::Error> {
    let id_str = id.to_string();
    let status = status.as_str().to_string();
    let now_str = Utc::now().to_rfc3339();

    let changed = self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "UPDATE client_profiles SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, now_str, id_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_profile(id).await
  }

  async fn delete_profile(&self, id: Uuid) -> Result<bool, anyhow::Error> {
    let id_str = id.to_string();
    let changed = self
      .conn
      .call(move |conn| {
        conn
          .execute("DELETE FROM client_profiles WHERE id = ?1", params![id_str])
          .map_err(|e| e.into())
      })
      .await?;
    Ok(changed > 0)
  }

  // ===========================================================================
  // Admin users & sessions
  // ===========================================================================

  async fn count_admin_users(&self) -> Result<u64, anyhow::Error> {
    self
      .conn
      .call(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM admin_users", [], |r| r.get(0))?;
        Ok(count as u64)
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn create_admin_user(
    &self,
    email: &str,
    password_hash: &str,
  ) -> Result<AdminUser, anyhow::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let id_str = id.to_string();
    let now_str = now.to_rfc3339();
    let email_owned = email.to_string();
    let hash_owned = password_hash.to_string();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO admin_users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id_str, email_owned, hash_owned, now_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    Ok(AdminUser {
      id,
      email: email.to_string(),
      password_hash: password_hash.to_string(),
      created_at: now,
    })
  }

  async fn get_admin_user_by_email(
    &self,
    email: &str,
  ) -> Result<Option<AdminUser>, anyhow::Error> {
    let email = email.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, email, password_hash, created_at FROM admin_users WHERE email = ?1",
        )?;
        let mut rows = stmt.query(params![email])?;
        if let Some(row) = rows.next()? {
          Ok(Some(row_to_admin_user(row)?))
        } else {
          Ok(None)
        }
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn create_admin_session(
    &self,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<AdminSession, anyhow::Error> {
    let id = Uuid::new_v4();
    let id_str = id.to_string();
    let user_str = user_id.to_string();
    let hash = token_hash.to_string();
    let expires_str = expires_at.to_rfc3339();
    let now_str = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO admin_sessions (id, user_id, token_hash, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id_str, user_str, hash, expires_str, now_str],
          )
          .map_err(|e| e.into())
      })
      .await?;

    Ok(AdminSession {
      id,
      user_id,
      expires_at,
    })
  }

  async fn validate_admin_session(
    &self,
    token_hash: &str,
  ) -> Result<Option<(AdminSession, AdminUser)>, anyhow::Error> {
    let hash = token_hash.to_string();
    let now_str = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT s.id, s.user_id, s.expires_at, u.id, u.email, u.password_hash, u.created_at
           FROM admin_sessions s JOIN admin_users u ON s.user_id = u.id
           WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        )?;
        let mut rows = stmt.query(params![hash, now_str])?;
        if let Some(row) = rows.next()? {
          let session = AdminSession {
            id: parse_uuid(row.get::<_, String>(0)?),
            user_id: parse_uuid(row.get::<_, String>(1)?),
            expires_at: parse_ts(row.get::<_, String>(2)?),
          };
          let user = AdminUser {
            id: parse_uuid(row.get::<_, String>(3)?),
            email: row.get(4)?,
            password_hash: row.get(5)?,
            created_at: parse_ts(row.get::<_, String>(6)?),
          };
          Ok(Some((session, user)))
        } else {
          Ok(None)
        }
      })
      .await
      .map_err(|e| anyhow::anyhow!("{}", e))
  }

  async fn delete_admin_session(&self, id: Uuid) -> Result<(), anyhow::Error> {
    let id_str = id.to_string();
    self
      .conn
      .call(move |conn| {
        conn
          .execute("DELETE FROM admin_sessions WHERE id = ?1", params![id_str])
          .map_err(|e| e.into())
      })
      .await?;
    Ok(())
  }
}

fn parse_uuid(s: String) -> Uuid {
  s.parse().unwrap_or_default()
}

fn parse_ts(s: String) -> DateTime<Utc> {
  chrono::DateTime::parse_from_rfc3339(&s)
    .map(|d| d.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}

fn row_to_content(row: &rusqlite::Row) -> Result<ContentEntry, rusqlite::Error> {
  let content_str: String = row.get(1)?;
  Ok(ContentEntry {
    key: row.get(0)?,
    content: serde_json::from_str(&content_str).unwrap_or(serde_json::Value::Null),
    updated_at: parse_ts(row.get::<_, String>(2)?),
  })
}

fn row_to_inquiry(row: &rusqlite::Row) -> Result<Inquiry, rusqlite::Error> {
  let metadata_str: String = row.get(8)?;
  Ok(Inquiry {
    id: parse_uuid(row.get::<_, String>(0)?),
    name: row.get(1)?,
    email: row.get(2)?,
    company: row.get(3)?,
    inquiry_type: row.get(4)?,
    subject: row.get(5)?,
    message: row.get(6)?,
    status: RecordStatus::new(row.get::<_, String>(7)?),
    metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
    created_at: parse_ts(row.get::<_, String>(9)?),
    updated_at: parse_ts(row.get::<_, String>(10)?),
  })
}

fn row_to_profile(row: &rusqlite::Row) -> Result<ClientProfile, rusqlite::Error> {
  let metadata_str: String = row.get(5)?;
  Ok(ClientProfile {
    id: parse_uuid(row.get::<_, String>(0)?),
    name: row.get(1)?,
    email: row.get(2)?,
    firm: row.get(3)?,
    status: RecordStatus::new(row.get::<_, String>(4)?),
    metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
    created_at: parse_ts(row.get::<_, String>(6)?),
    updated_at: parse_ts(row.get::<_, String>(7)?),
  })
}

fn row_to_admin_user(row: &rusqlite::Row) -> Result<AdminUser, rusqlite::Error> {
  Ok(AdminUser {
    id: parse_uuid(row.get::<_, String>(0)?),
    email: row.get(1)?,
    password_hash: row.get(2)?,
    created_at: parse_ts(row.get::<_, String>(3)?),
  })
}
