//! Shared types for TimeScale
//!
//! Types used by the server and its clients: domain models, the unified
//! error system, auth DTOs and small utilities.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
