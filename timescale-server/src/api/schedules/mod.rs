//! Schedule API
//!
//! | Path | Method | Gate |
//! |------|--------|------|
//! | /api/schedules | GET | signed in |
//! | /api/schedules/search | POST | signed in |
//! | /api/schedules/{id} | GET | signed in |
//! | /api/schedules | POST | manager or admin |
//! | /api/schedules/{id} | PUT, DELETE | manager or admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_manager_or_admin, require_signed_in};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/schedules", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/search", post(handler::search))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_signed_in));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_manager_or_admin));

    read_routes.merge(manage_routes)
}
