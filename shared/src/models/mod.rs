//! Data models
//!
//! Shared between timescale-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod admin;
pub mod file_ref;
pub mod schedule;
pub mod staff;
pub mod time_log;

// Re-exports
pub use admin::*;
pub use file_ref::*;
pub use schedule::*;
pub use staff::*;
pub use time_log::*;
