//! File reference API
//!
//! | Path | Method | Gate |
//! |------|--------|------|
//! | /api/files/{id} | GET | signed in |
//! | /api/files | DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::auth::{require_admin, require_signed_in};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/files/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_signed_in));

    let admin_routes = Router::new()
        .route("/api/files", delete(handler::remove))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(admin_routes)
}
