mod backend;
mod postgres;
mod sanitize;
mod sqlite;

pub use backend::{ContentStore, DatabaseBackend};
pub use postgres::PostgresBackend;
pub use sanitize::{validate_content_key, KeyError, MAX_KEY_LENGTH};
pub use sqlite::SqliteBackend;
