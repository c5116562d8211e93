//! Sign-in routes
//!
//! Both are public. There is no logout: tokens simply expire.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/signin", post(handler::admin_signin))
        .route("/api/staff/signin", post(handler::staff_signin))
}
