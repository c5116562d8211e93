//! Unified error codes for TimeScale
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Staff errors
//! - 4xxx: Schedule errors
//! - 5xxx: Attendance errors
//! - 6xxx: File errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Manager or admin role required
    ManagerRequired = 2006,

    // ==================== 3xxx: Staff ====================
    StaffNotFound = 3001,
    AadharAlreadyRegistered = 3002,
    EmailAlreadyRegistered = 3003,
    RegistrationIdExists = 3004,
    /// Identity keys cannot be changed after registration
    ImmutableField = 3005,

    // ==================== 4xxx: Schedule ====================
    ScheduleNotFound = 4001,
    ScheduleNameExists = 4002,
    DuplicateDayOff = 4003,

    // ==================== 5xxx: Attendance ====================
    TimeLogNotFound = 5001,
    /// First clock-in of the day is more than an hour away from shift start
    ClockInOutsideShiftWindow = 5002,
    ClockOutBeforeClockIn = 5003,
    /// Admins do not keep time logs
    AdminCannotClockIn = 5004,

    // ==================== 6xxx: File ====================
    FileNotFound = 6001,
    UnsupportedFileType = 6002,
    FileTooLarge = 6003,
    StorageUnavailable = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::ManagerRequired => "Manager or admin role required",

            ErrorCode::StaffNotFound => "Staff not found",
            ErrorCode::AadharAlreadyRegistered => "Aadhar number is already registered",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::RegistrationIdExists => "Registration id already exists",
            ErrorCode::ImmutableField => "Field cannot be changed",

            ErrorCode::ScheduleNotFound => "Schedule not found",
            ErrorCode::ScheduleNameExists => "Schedule name already exists",
            ErrorCode::DuplicateDayOff => "Day off listed more than once",

            ErrorCode::TimeLogNotFound => "Time log not found",
            ErrorCode::ClockInOutsideShiftWindow => {
                "You can't clock in more than an hour away from your shift start"
            }
            ErrorCode::ClockOutBeforeClockIn => "Clock out cannot be earlier than clock in",
            ErrorCode::AdminCannotClockIn => "Admins do not record time logs",

            ErrorCode::FileNotFound => "File not found",
            ErrorCode::UnsupportedFileType => "Unsupported file type",
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::StorageUnavailable => "Object storage unavailable",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::ManagerRequired),

            // Staff
            3001 => Ok(ErrorCode::StaffNotFound),
            3002 => Ok(ErrorCode::AadharAlreadyRegistered),
            3003 => Ok(ErrorCode::EmailAlreadyRegistered),
            3004 => Ok(ErrorCode::RegistrationIdExists),
            3005 => Ok(ErrorCode::ImmutableField),

            // Schedule
            4001 => Ok(ErrorCode::ScheduleNotFound),
            4002 => Ok(ErrorCode::ScheduleNameExists),
            4003 => Ok(ErrorCode::DuplicateDayOff),

            // Attendance
            5001 => Ok(ErrorCode::TimeLogNotFound),
            5002 => Ok(ErrorCode::ClockInOutsideShiftWindow),
            5003 => Ok(ErrorCode::ClockOutBeforeClockIn),
            5004 => Ok(ErrorCode::AdminCannotClockIn),

            // File
            6001 => Ok(ErrorCode::FileNotFound),
            6002 => Ok(ErrorCode::UnsupportedFileType),
            6003 => Ok(ErrorCode::FileTooLarge),
            6004 => Ok(ErrorCode::StorageUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::ManagerRequired.code(), 2006);
        assert_eq!(ErrorCode::AadharAlreadyRegistered.code(), 3002);
        assert_eq!(ErrorCode::DuplicateDayOff.code(), 4003);
        assert_eq!(ErrorCode::ClockInOutsideShiftWindow.code(), 5002);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6003);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::StaffNotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(3001), Ok(ErrorCode::StaffNotFound));
        assert_eq!(ErrorCode::try_from(5003), Ok(ErrorCode::ClockOutBeforeClockIn));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(3006), Err(InvalidErrorCode(3006)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ScheduleNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("1003").unwrap();
        assert_eq!(code, ErrorCode::TokenExpired);
        assert!(serde_json::from_str::<ErrorCode>("7777").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::TimeLogNotFound.to_string(), "5001");
        assert_eq!(InvalidErrorCode(12).to_string(), "invalid error code: 12");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::StaffNotFound.message(), "Staff not found");
        assert_eq!(
            ErrorCode::ClockInOutsideShiftWindow.message(),
            "You can't clock in more than an hour away from your shift start"
        );
    }
}
