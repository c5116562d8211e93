//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::StaffNotFound
            | Self::ScheduleNotFound
            | Self::TimeLogNotFound
            | Self::FileNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::AadharAlreadyRegistered
            | Self::EmailAlreadyRegistered
            | Self::RegistrationIdExists
            | Self::ScheduleNameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::ManagerRequired
            | Self::AdminCannotClockIn
            | Self::ClockInOutsideShiftWindow => StatusCode::FORBIDDEN,

            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // 503 Service Unavailable (transient, client can retry)
            Self::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::StaffNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ScheduleNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::AadharAlreadyRegistered.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::ScheduleNameExists.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_and_gate_status() {
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::ManagerRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::ClockInOutsideShiftWindow.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(ErrorCode::RequiredField.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::DuplicateDayOff.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ClockOutBeforeClockIn.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::StorageUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
