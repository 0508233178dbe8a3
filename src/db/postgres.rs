use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use uuid::Uuid;

use super::backend::{ContentStore, DatabaseBackend};
use super::sanitize::validate_content_key;
use crate::types::{
  AdminSession, AdminUser, ClientProfile, ContentEntry, Inquiry, NewInquiry, NewProfile,
  RecordStatus,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS content_entries (
    key VARCHAR(64) PRIMARY KEY,
    content JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS inquiries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    company VARCHAR(255),
    inquiry_type VARCHAR(64) NOT NULL DEFAULT 'general',
    subject TEXT,
    message TEXT NOT NULL DEFAULT '',
    status VARCHAR(64) NOT NULL DEFAULT 'new',
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_inquiries_status ON inquiries(status);
CREATE INDEX IF NOT EXISTS idx_inquiries_created ON inquiries(created_at);

CREATE TABLE IF NOT EXISTS client_profiles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    firm VARCHAR(255),
    status VARCHAR(64) NOT NULL DEFAULT 'new',
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_client_profiles_created ON client_profiles(created_at);

CREATE TABLE IF NOT EXISTS admin_users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS admin_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES admin_users(id) ON DELETE CASCADE,
    token_hash VARCHAR(64) NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_admin_sessions_token ON admin_sessions(token_hash);
"#;

const INQUIRY_COLS: &str =
  "id, name, email, company, inquiry_type, subject, message, status, metadata, created_at, updated_at";
const PROFILE_COLS: &str = "id, name, email, firm, status, metadata, created_at, updated_at";

pub struct PostgresBackend {
  pool: Pool,
}

impl PostgresBackend {
  pub fn new(url: &str, max_connections: usize) -> Result<Self, anyhow::Error> {
    let mut cfg = Config::new();
    cfg.url = Some(url.into());
    cfg.manager = Some(ManagerConfig {
      recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(deadpool_postgres::PoolConfig::new(max_connections));
    let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
    Ok(Self { pool })
  }
}

#[async_trait]
impl ContentStore for PostgresBackend {
  async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, anyhow::Error> {
    validate_content_key(key)?;
    let rows = self
      .pool
      .get()
      .await?
      .query(
        "SELECT key, content, updated_at FROM content_entries WHERE key = $1",
        &[&key],
      )
      .await?;
    Ok(rows.first().map(|row| ContentEntry {
      key: row.get(0),
      content: row.get(1),
      updated_at: row.get(2),
    }))
  }

  async fn upsert_content(
    &self,
    key: &str,
    content: serde_json::Value,
  ) -> Result<ContentEntry, anyhow::Error> {
    validate_content_key(key)?;
    let now = Utc::now();
    self
      .pool
      .get()
      .await?
      .execute(
        "INSERT INTO content_entries (key, content, updated_at) VALUES ($1, $2, $3)
         ON CONFLICT (key) DO UPDATE SET content = EXCLUDED.content, updated_at = EXCLUDED.updated_at",
        &[&key, &content, &now],
      )
      .await?;
    Ok(ContentEntry {
      key: key.to_string(),
      content,
      updated_at: now,
    })
  }

  async fn list_content_keys(&self) -> Result<Vec<String>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query("SELECT key FROM content_entries ORDER BY key", &[])
      .await?;
    Ok(rows.iter().map(|r| r.get(0)).collect())
  }
}

#[async_trait]
impl DatabaseBackend for PostgresBackend {
  async fn init_schema(&self) -> Result<(), anyhow::Error> {
    self.pool.get().await?.batch_execute(SCHEMA).await?;
    tracing::info!("PostgreSQL schema initialized");
    Ok(())
  }

  // ===========================================================================
  // Inquiries
  // ===========================================================================

  async fn insert_inquiry(&self, new: NewInquiry) -> Result<Inquiry, anyhow::Error> {
    let row = self
      .pool
      .get()
      .await?
      .query_one(
        &format!(
          "INSERT INTO inquiries (name, email, company, inquiry_type, subject, message)
           VALUES ($1, $2, $3, $4, $5, $6) RETURNING {INQUIRY_COLS}"
        ),
        &[
          &new.name,
          &new.email,
          &new.company,
          &new.inquiry_type,
          &new.subject,
          &new.message,
        ],
      )
      .await?;
    Ok(row_to_inquiry(&row))
  }

  async fn list_inquiries(&self) -> Result<Vec<Inquiry>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!("SELECT {INQUIRY_COLS} FROM inquiries ORDER BY created_at DESC"),
        &[],
      )
      .await?;
    Ok(rows.iter().map(row_to_inquiry).collect())
  }

  async fn get_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!("SELECT {INQUIRY_COLS} FROM inquiries WHERE id = $1"),
        &[&id],
      )
      .await?;
    Ok(rows.first().map(row_to_inquiry))
  }

  async fn update_inquiry_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<Inquiry>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!(
          "UPDATE inquiries SET status = $1, updated_at = NOW() WHERE id = $2
           RETURNING {INQUIRY_COLS}"
        ),
        &[&status.as_str(), &id],
      )
      .await?;
    Ok(rows.first().map(row_to_inquiry))
  }

  async fn update_inquiry_metadata(
    &self,
    id: Uuid,
    metadata: serde_json::Value,
  ) -> Result<Option<Inquiry>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!(
          "UPDATE inquiries SET metadata = $1, updated_at = NOW() WHERE id = $2
           RETURNING {INQUIRY_COLS}"
        ),
        &[&metadata, &id],
      )
      .await?;
    Ok(rows.first().map(row_to_inquiry))
  }

  async fn delete_inquiry(&self, id: Uuid) -> Result<bool, anyhow::Error> {
    let changed = self
      .pool
      .get()
      .await?
      .execute("DELETE FROM inquiries WHERE id = $1", &[&id])
      .await?;
    Ok(changed > 0)
  }

  // ===========================================================================
  // Client profiles
  // ===========================================================================

  async fn insert_profile(&self, new: NewProfile) -> Result<ClientProfile, anyhow::Error> {
    let row = self
      .pool
      .get()
      .await?
      .query_one(
        &format!(
          "INSERT INTO client_profiles (name, email, firm)
           VALUES ($1, $2, $3) RETURNING {PROFILE_COLS}"
        ),
        &[&new.name, &new.email, &new.firm],
      )
      .await?;
    Ok(row_to_profile(&row))
  }

  async fn list_profiles(&self) -> Result<Vec<ClientProfile>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!("SELECT {PROFILE_COLS} FROM client_profiles ORDER BY created_at DESC"),
        &[],
      )
      .await?;
    Ok(rows.iter().map(row_to_profile).collect())
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<ClientProfile>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!("SELECT {PROFILE_COLS} FROM client_profiles WHERE id = $1"),
        &[&id],
      )
      .await?;
    Ok(rows.first().map(row_to_profile))
  }

  async fn update_profile_status(
    &self,
    id: Uuid,
    status: &RecordStatus,
  ) -> Result<Option<ClientProfile>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        &format!(
          "UPDATE client_profiles SET status = $1, updated_at = NOW() WHERE id = $2
           RETURNING {PROFILE_COLS}"
        ),
        &[&status.as_str(), &id],
      )
      .await?;
    Ok(rows.first().map(row_to_profile))
  }

  async fn delete_profile(&self, id: Uuid) -> Result<bool, anyhow::Error> {
    let changed = self
      .pool
      .get()
      .await?
      .execute("DELETE FROM client_profiles WHERE id = $1", &[&id])
      .await?;
    Ok(changed > 0)
  }

  // ===========================================================================
  // Admin users & sessions
  // ===========================================================================

  async fn count_admin_users(&self) -> Result<u64, anyhow::Error> {
    let row = self
      .pool
      .get()
      .await?
      .query_one("SELECT COUNT(*) FROM admin_users", &[])
      .await?;
    let count: i64 = row.get(0);
    Ok(count as u64)
  }

  async fn create_admin_user(
    &self,
    email: &str,
    password_hash: &str,
  ) -> Result<AdminUser, anyhow::Error> {
    let row = self
      .pool
      .get()
      .await?
      .query_one(
        "INSERT INTO admin_users (email, password_hash) VALUES ($1, $2)
         RETURNING id, email, password_hash, created_at",
        &[&email, &password_hash],
      )
      .await?;
    Ok(row_to_admin_user(&row))
  }

  async fn get_admin_user_by_email(
    &self,
    email: &str,
  ) -> Result<Option<AdminUser>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        "SELECT id, email, password_hash, created_at FROM admin_users WHERE email = $1",
        &[&email],
      )
      .await?;
    Ok(rows.first().map(row_to_admin_user))
  }

  async fn create_admin_session(
    &self,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<AdminSession, anyhow::Error> {
    let row = self
      .pool
      .get()
      .await?
      .query_one(
        "INSERT INTO admin_sessions (user_id, token_hash, expires_at)
         VALUES ($1, $2, $3) RETURNING id, user_id, expires_at",
        &[&user_id, &token_hash, &expires_at],
      )
      .await?;
    Ok(AdminSession {
      id: row.get(0),
      user_id: row.get(1),
      expires_at: row.get(2),
    })
  }

  async fn validate_admin_session(
    &self,
    token_hash: &str,
  ) -> Result<Option<(AdminSession, AdminUser)>, anyhow::Error> {
    let rows = self
      .pool
      .get()
      .await?
      .query(
        "SELECT s.id, s.user_id, s.expires_at, u.id, u.email, u.password_hash, u.created_at
         FROM admin_sessions s JOIN admin_users u ON s.user_id = u.id
         WHERE s.token_hash = $1 AND s.expires_at > NOW()",
        &[&token_hash],
      )
      .await?;
    Ok(rows.first().map(|row| {
      (
        AdminSession {
          id: row.get(0),
          user_id: row.get(1),
          expires_at: row.get(2),
        },
        AdminUser {
          id: row.get(3),
          email: row.get(4),
          password_hash: row.get(5),
          created_at: row.get(6),
        },
      )
    }))
  }

  async fn delete_admin_session(&self, id: Uuid) -> Result<(), anyhow::Error> {
    self
      .pool
      .get()
      .await?
      .execute("DELETE FROM admin_sessions WHERE id = $1", &[&id])
      .await?;
    Ok(())
  }
}

fn row_to_inquiry(row: &tokio_postgres::Row) -> Inquiry {
  Inquiry {
    id: row.get(0),
    name: row.get(1),
    email: row.get(2),
    company: row.get(3),
    inquiry_type: row.get(4),
    subject: row.get(5),
    message: row.get(6),
    status: RecordStatus::new(row.get::<_, String>(7)),
    metadata: row.get(8),
    created_at: row.get(9),
    updated_at: row.get(10),
  }
}

fn row_to_profile(row: &tokio_postgres::Row) -> ClientProfile {
  ClientProfile {
    id: row.get(0),
    name: row.get(1),
    email: row.get(2),
    firm: row.get(3),
    status: RecordStatus::new(row.get::<_, String>(4)),
    metadata: row.get(5),
    created_at: row.get(6),
    updated_at: row.get(7),
  }
}

fn row_to_admin_user(row: &tokio_postgres::Row) -> AdminUser {
  AdminUser {
    id: row.get(0),
    email: row.get(1),
    password_hash: row.get(2),
    created_at: row.get(3),
  }
}
