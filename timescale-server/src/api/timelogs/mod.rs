//! Attendance API
//!
//! | Path | Method | Gate |
//! |------|--------|------|
//! | /api/timelogs/punch | POST | staff (admins are sent home) |
//! | /api/timelogs/status | GET | staff (admins are sent home) |
//!
//! Managers may pass `staff_id` to act for someone else.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_signed_in;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/timelogs/punch", post(handler::punch))
        .route("/api/timelogs/status", get(handler::status))
        .layer(middleware::from_fn(require_signed_in))
}
