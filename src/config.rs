use serde::{Deserialize, Serialize};
use std::path::Path;

/// Expand environment variables in a string.
/// Supports $VAR_NAME and ${VAR_NAME} syntax. Unset variables expand to the
/// empty string. Scans by character, so config files may contain arbitrary
/// UTF-8 text around the references.
fn expand_env_vars(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut chars = input.chars().peekable();

  while let Some(c) = chars.next() {
    if c != '$' {
      out.push(c);
      continue;
    }
    match chars.peek() {
      // ${VAR_NAME}
      Some('{') => {
        chars.next();
        let mut name = String::new();
        let mut closed = false;
        for n in chars.by_ref() {
          if n == '}' {
            closed = true;
            break;
          }
          name.push(n);
        }
        if closed {
          out.push_str(&std::env::var(&name).unwrap_or_default());
        } else {
          // Unterminated reference, keep the text as written
          out.push_str("${");
          out.push_str(&name);
        }
      }
      // $VAR_NAME (word boundary: alphanumeric + underscore)
      Some(&n) if n.is_ascii_alphanumeric() || n == '_' => {
        let mut name = String::new();
        while let Some(&n) = chars.peek() {
          if n.is_ascii_alphanumeric() || n == '_' {
            name.push(n);
            chars.next();
          } else {
            break;
          }
        }
        out.push_str(&std::env::var(&name).unwrap_or_default());
      }
      _ => out.push('$'),
    }
  }

  out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
  #[default]
  Sqlite,
  Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub backend: BackendType,
  #[serde(default)]
  pub sqlite: SqliteSection,
  #[serde(default)]
  pub postgres: PostgresSection,
  #[serde(default)]
  pub auth: AuthSection,
  #[serde(default)]
  pub content: ContentSection,
  #[serde(default)]
  pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_http_port")]
  pub port: u16,
  /// CORS allowed origins for the admin frontend.
  /// Use ["*"] for permissive mode, or specify origins like ["http://localhost:3000"]
  #[serde(default)]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String {
  "0.0.0.0".into()
}
fn default_http_port() -> u16 {
  8090
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_http_port(),
      cors_origins: vec!["*".to_string()],
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSection {
  #[serde(default = "default_sqlite_path")]
  pub path: String,
}
fn default_sqlite_path() -> String {
  "atlascms.db".into()
}
impl Default for SqliteSection {
  fn default() -> Self {
    Self {
      path: default_sqlite_path(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSection {
  #[serde(default = "default_pg_url")]
  pub url: String,
  #[serde(default = "default_max_conn")]
  pub max_connections: usize,
}
fn default_pg_url() -> String {
  "postgres://localhost/atlascms".into()
}
fn default_max_conn() -> usize {
  10
}
impl Default for PostgresSection {
  fn default() -> Self {
    Self {
      url: default_pg_url(),
      max_connections: default_max_conn(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Session lifetime in hours.
  #[serde(default = "default_session_ttl")]
  pub session_ttl_hours: i64,
}
fn default_true() -> bool {
  true
}
fn default_session_ttl() -> i64 {
  24 * 7
}
impl Default for AuthSection {
  fn default() -> Self {
    Self {
      enabled: true,
      session_ttl_hours: default_session_ttl(),
    }
  }
}

/// Limits for inline image capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
  /// Maximum accepted upload size in megabytes.
  #[serde(default = "default_max_image_mb")]
  pub max_image_mb: usize,
  /// Maximum stored image width in pixels.
  #[serde(default = "default_max_image_width")]
  pub max_image_width: u32,
  /// JPEG re-encode quality (1-100).
  #[serde(default = "default_jpeg_quality")]
  pub jpeg_quality: u8,
}
fn default_max_image_mb() -> usize {
  2
}
fn default_max_image_width() -> u32 {
  800
}
fn default_jpeg_quality() -> u8 {
  80
}
impl Default for ContentSection {
  fn default() -> Self {
    Self {
      max_image_mb: default_max_image_mb(),
      max_image_width: default_max_image_width(),
      jpeg_quality: default_jpeg_quality(),
    }
  }
}

impl ContentSection {
  pub fn image_policy(&self) -> crate::content::ImagePolicy {
    crate::content::ImagePolicy {
      max_bytes: self.max_image_mb * 1024 * 1024,
      max_width: self.max_image_width,
      jpeg_quality: self.jpeg_quality,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
  #[serde(default = "default_level")]
  pub level: String,
}
fn default_level() -> String {
  "info".into()
}
impl Default for LoggingSection {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

impl ServerConfig {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    let expanded = expand_env_vars(&content);
    Ok(serde_yaml::from_str(&expanded)?)
  }

  pub fn find_and_load() -> Result<Option<Self>, anyhow::Error> {
    for p in ["atlascms.yaml", "atlascms.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }

  pub fn address(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_sane() {
    let config = ServerConfig::default();
    assert_eq!(config.backend, BackendType::Sqlite);
    assert_eq!(config.server.port, 8090);
    assert!(config.auth.enabled);
    assert_eq!(config.content.max_image_mb, 2);
    assert_eq!(config.content.max_image_width, 800);
  }

  #[test]
  fn parses_partial_yaml() {
    let config: ServerConfig = serde_yaml::from_str(
      "server:\n  port: 9999\nbackend: postgres\ncontent:\n  max_image_mb: 5\n",
    )
    .unwrap();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.backend, BackendType::Postgres);
    assert_eq!(config.content.max_image_mb, 5);
    // untouched sections keep defaults
    assert_eq!(config.content.jpeg_quality, 80);
    assert_eq!(config.sqlite.path, "atlascms.db");
  }

  #[test]
  fn env_expansion_handles_both_syntaxes() {
    std::env::set_var("ATLASCMS_TEST_DB", "cms.db");
    assert_eq!(expand_env_vars("path: $ATLASCMS_TEST_DB"), "path: cms.db");
    assert_eq!(
      expand_env_vars("path: ${ATLASCMS_TEST_DB}.bak"),
      "path: cms.db.bak"
    );
    // bare and trailing dollars pass through
    assert_eq!(expand_env_vars("cost: $ %"), "cost: $ %");
    assert_eq!(expand_env_vars("end$"), "end$");
  }

  #[test]
  fn env_expansion_is_char_safe() {
    std::env::set_var("ATLASCMS_TEST_HOST", "0.0.0.0");
    let input = "# café in München\nhost: $ATLASCMS_TEST_HOST";
    assert_eq!(
      expand_env_vars(input),
      "# café in München\nhost: 0.0.0.0"
    );
  }
}
