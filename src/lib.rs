pub mod config;
pub mod content;
pub mod db;
pub mod review;
pub mod server;
pub mod types;
