//! Input validation helpers
//!
//! Length limits and format rules for staff, schedule and upload input.
//! SQLite TEXT has no built-in length enforcement.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::utils::{AppError, AppResult, ErrorCode};

// ── Limits ──────────────────────────────────────────────────────────

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 155;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_CITY_LEN: usize = 100;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Staff must be between these ages (inclusive) when registered or edited
pub const MIN_AGE: i32 = 20;
pub const MAX_AGE: i32 = 90;

/// Uploaded pictures
pub const MAX_PICTURE_BYTES: usize = 2 * 1024 * 1024;
pub const PICTURE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

// ── Patterns ────────────────────────────────────────────────────────

static MOBILE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\+\d{1,2}\s)?\d{10}$").ok());
static AADHAR_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{12}$").ok());
static PINCODE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{6}$").ok());
static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

fn invalid(field: &str, message: String) -> AppError {
    AppError::validation(message).with_detail("field", field)
}

// ── Validators ──────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(invalid(
            field,
            format!("{field} is too long ({} chars, max {max_len})", value.chars().count()),
        ));
    }
    Ok(())
}

pub fn validate_name(value: &str) -> AppResult<()> {
    validate_required_text(value, "name", MAX_NAME_LEN)?;
    if value.trim().chars().count() < MIN_NAME_LEN {
        return Err(invalid(
            "name",
            format!("name must be at least {MIN_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> AppResult<()> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    if !matches(&EMAIL_RE, value) {
        return Err(invalid("email", format!("Invalid email address: {value}")));
    }
    Ok(())
}

/// Ten digits, optionally prefixed by a country code: `+91 9876543210`
pub fn validate_mobile(value: &str, field: &str) -> AppResult<()> {
    if !matches(&MOBILE_RE, value) {
        return Err(invalid(field, format!("Invalid {field} number: {value}")));
    }
    Ok(())
}

pub fn validate_aadhar(value: &str) -> AppResult<()> {
    if !matches(&AADHAR_RE, value) {
        return Err(invalid("aadhar", "Aadhar number must be 12 digits".into()));
    }
    Ok(())
}

pub fn validate_pincode(value: &str) -> AppResult<()> {
    if !matches(&PINCODE_RE, value) {
        return Err(invalid("pincode", "Pincode must be 6 digits".into()));
    }
    Ok(())
}

pub fn validate_password(value: &str) -> AppResult<()> {
    validate_required_text(value, "password", MAX_PASSWORD_LEN)
}

pub fn validate_age(dob: NaiveDate, today: NaiveDate) -> AppResult<()> {
    let age = crate::utils::time::age_on(dob, today);
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Age must be between {MIN_AGE} and {MAX_AGE}, got {age}"),
        )
        .with_detail("field", "dob"));
    }
    Ok(())
}

/// Lowercased extension of an uploaded file name, if any
pub fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Picture uploads: allowed extension and at most [`MAX_PICTURE_BYTES`]
pub fn validate_picture(file_name: &str, len: usize) -> AppResult<()> {
    let ext = file_extension(file_name).unwrap_or_default();
    if !PICTURE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileType,
            format!("Unsupported format: {ext}. Supported: jpg, jpeg, png, webp"),
        ));
    }
    if len > MAX_PICTURE_BYTES {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {len} bytes (max {MAX_PICTURE_BYTES})"),
        ));
    }
    Ok(())
}
