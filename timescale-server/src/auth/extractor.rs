//! Principal extractor
//!
//! Handlers behind a gate take the caller as an argument.

use axum::extract::FromRequestParts;
use http::request::Parts;

use super::Principal;
use super::gate::{GateRejection, STAFF_SIGNIN};
use super::middleware::AuthFailure;

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(*principal);
        }
        Err(match parts.extensions.get::<AuthFailure>() {
            Some(failure) => GateRejection::new(failure.0.clone(), STAFF_SIGNIN),
            None => GateRejection::signed_out(STAFF_SIGNIN),
        })
    }
}
