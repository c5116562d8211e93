//! Authentication middleware
//!
//! [`authenticate`] runs on every request and, given a valid bearer token,
//! puts the caller's [`Principal`] into the request extensions. The role
//! gates below read it from there.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::error::AppError;

use super::gate::{self, ADMIN_SIGNIN, GateRejection, STAFF_SIGNIN};
use super::{JwtError, JwtService, Principal};
use crate::core::ServerState;
use crate::security_log;

/// Why a presented token was not accepted, kept for the gate's error body
#[derive(Debug, Clone)]
pub struct AuthFailure(pub AppError);

pub async fn authenticate(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(header) = header {
        let outcome = match JwtService::extract_from_header(header) {
            Some(token) => state
                .jwt
                .validate_token(token)
                .and_then(Principal::try_from)
                .map_err(|e| {
                    security_log!("WARN", "auth_failed", error = e, uri = req.uri());
                    match e {
                        JwtError::ExpiredToken => AppError::token_expired(),
                        _ => AppError::invalid_token("Invalid token"),
                    }
                }),
            None => Err(AppError::invalid_token("Invalid authorization header")),
        };
        match outcome {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
            }
            Err(err) => {
                req.extensions_mut().insert(AuthFailure(err));
            }
        }
    }

    next.run(req).await
}

/// The caller, or a rejection naming the sign-in page to use
pub(crate) fn principal_of(req: &Request, signin: &'static str) -> Result<Principal, GateRejection> {
    if let Some(principal) = req.extensions().get::<Principal>() {
        return Ok(*principal);
    }
    let error = req
        .extensions()
        .get::<AuthFailure>()
        .map(|f| f.0.clone())
        .unwrap_or_else(AppError::not_authenticated);
    security_log!("WARN", "auth_missing", uri = req.uri());
    Err(GateRejection::new(error, signin))
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, GateRejection> {
    let principal = principal_of(&req, ADMIN_SIGNIN)?;
    gate::require_admin(&principal)?;
    Ok(next.run(req).await)
}

pub async fn require_manager_or_admin(req: Request, next: Next) -> Result<Response, GateRejection> {
    let principal = principal_of(&req, STAFF_SIGNIN)?;
    gate::require_manager_or_admin(&principal)?;
    Ok(next.run(req).await)
}

pub async fn require_signed_in(req: Request, next: Next) -> Result<Response, GateRejection> {
    principal_of(&req, STAFF_SIGNIN)?;
    Ok(next.run(req).await)
}
