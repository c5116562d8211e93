//! HTTP API
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - admin and staff sign-in
//! - [`staff`] - staff directory and per-staff time logs
//! - [`schedules`] - schedule catalog
//! - [`timelogs`] - clock in / clock out
//! - [`files`] - stored file references

pub mod auth;
pub mod files;
pub mod form;
pub mod health;
pub mod schedules;
pub mod staff;
pub mod timelogs;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::GateRejection;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError};

/// Largest accepted request body: one picture plus its form data
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Handler failure: either a gate redirect or an error envelope
#[derive(Debug)]
pub enum ApiError {
    Gate(GateRejection),
    App(AppError),
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        ApiError::Gate(rejection)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gate(rejection) => rejection.into_response(),
            ApiError::App(err) => err.into_response(),
        }
    }
}

/// Result for handlers that check a gate themselves
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(staff::router())
        .merge(schedules::router())
        .merge(timelogs::router())
        .merge(files::router())
}

/// Routes with the full middleware stack; used by the server and by tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Layers wrap outward: the id is set before propagation copies it back
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        // Reads the bearer token into a Principal before any route gate runs
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::authenticate,
        ))
}
