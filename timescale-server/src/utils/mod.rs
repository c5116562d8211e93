//! Utilities: error re-exports, logging, time, validation, credentials

pub mod credentials;
pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> AppResult<ApiResponse<T>> {
    Ok(ApiResponse::success(data))
}

/// Wrap data in a success envelope with a user-facing message
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> AppResult<ApiResponse<T>> {
    Ok(ApiResponse::success_with_message(message, data))
}
