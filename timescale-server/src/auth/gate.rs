//! Access gates
//!
//! A failed gate answers `303 See Other` pointing at the sign-in page for
//! the role the caller would need, with the usual error envelope as body.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use shared::error::{ApiResponse, AppError, ErrorCode};

use super::Principal;
use crate::security_log;

pub const ADMIN_SIGNIN: &str = "/admin/signin";
pub const STAFF_SIGNIN: &str = "/staff/signin";
/// Where admins are sent when they try to use the staff clock
pub const ADMIN_HOME: &str = "/admin";

#[derive(Debug)]
pub struct GateRejection {
    pub error: AppError,
    pub location: &'static str,
}

impl GateRejection {
    pub fn new(error: AppError, location: &'static str) -> Self {
        Self { error, location }
    }

    /// No usable credentials for a gate whose sign-in page is `location`
    pub fn signed_out(location: &'static str) -> Self {
        Self::new(AppError::not_authenticated(), location)
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, self.location)],
            Json(ApiResponse::<()>::error(&self.error)),
        )
            .into_response()
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), GateRejection> {
    if principal.is_admin {
        return Ok(());
    }
    security_log!("WARN", "admin_required", user_id = principal.id);
    Err(GateRejection::new(
        AppError::new(ErrorCode::AdminRequired),
        ADMIN_SIGNIN,
    ))
}

pub fn require_manager_or_admin(principal: &Principal) -> Result<(), GateRejection> {
    if principal.is_elevated() {
        return Ok(());
    }
    security_log!("WARN", "manager_required", user_id = principal.id);
    Err(GateRejection::new(
        AppError::new(ErrorCode::ManagerRequired),
        STAFF_SIGNIN,
    ))
}

/// Plain staff may only touch their own records
pub fn require_self_or_elevated(principal: &Principal, staff_id: i64) -> Result<(), GateRejection> {
    if principal.is_elevated() || principal.id == staff_id {
        return Ok(());
    }
    security_log!(
        "WARN",
        "permission_denied",
        user_id = principal.id,
        target_staff = staff_id
    );
    Err(GateRejection::new(
        AppError::permission_denied("Staff may only act on their own records"),
        STAFF_SIGNIN,
    ))
}

/// Admins have no attendance of their own
pub fn reject_admin_clock(principal: &Principal) -> Result<(), GateRejection> {
    if principal.is_admin {
        return Err(GateRejection::new(
            AppError::new(ErrorCode::AdminCannotClockIn),
            ADMIN_HOME,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAFF: Principal = Principal {
        id: 7,
        is_admin: false,
        is_manager: false,
    };
    const MANAGER: Principal = Principal {
        id: 8,
        is_admin: false,
        is_manager: true,
    };
    const ADMIN: Principal = Principal {
        id: 1,
        is_admin: true,
        is_manager: false,
    };

    #[test]
    fn test_gates() {
        assert!(require_admin(&ADMIN).is_ok());
        assert_eq!(require_admin(&MANAGER).unwrap_err().location, ADMIN_SIGNIN);

        assert!(require_manager_or_admin(&MANAGER).is_ok());
        assert!(require_manager_or_admin(&ADMIN).is_ok());
        let rejected = require_manager_or_admin(&STAFF).unwrap_err();
        assert_eq!(rejected.location, STAFF_SIGNIN);
        assert_eq!(rejected.error.code, ErrorCode::ManagerRequired);

        assert!(require_self_or_elevated(&STAFF, 7).is_ok());
        assert!(require_self_or_elevated(&STAFF, 8).is_err());
        assert!(require_self_or_elevated(&MANAGER, 7).is_ok());

        assert_eq!(reject_admin_clock(&ADMIN).unwrap_err().location, ADMIN_HOME);
        assert!(reject_admin_clock(&STAFF).is_ok());
    }

    #[test]
    fn test_rejection_is_see_other_with_location() {
        let response = GateRejection::signed_out(STAFF_SIGNIN).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], STAFF_SIGNIN);
    }
}
