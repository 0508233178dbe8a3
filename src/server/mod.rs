mod api;
pub mod auth;

pub use api::{router, AdminServer, AppState};
