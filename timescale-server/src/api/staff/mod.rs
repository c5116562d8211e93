//! Staff API
//!
//! | Path | Method | Gate |
//! |------|--------|------|
//! | /api/staff | GET, POST | manager or admin |
//! | /api/staff/search | POST | manager or admin |
//! | /api/staff/{id} | PUT, DELETE | manager or admin |
//! | /api/staff/{id}/schedule | PUT | manager or admin |
//! | /api/staff/{id} | GET | self, manager or admin |
//! | /api/staff/{id}/timelogs | GET | self, manager or admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_manager_or_admin, require_signed_in};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    // Own records; the handler compares the caller with the path id
    let own_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/timelogs", get(handler::timelogs))
        .layer(middleware::from_fn(require_signed_in));

    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/search", post(handler::search))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/schedule", put(handler::assign_schedule))
        .layer(middleware::from_fn(require_manager_or_admin));

    own_routes.merge(manage_routes)
}
