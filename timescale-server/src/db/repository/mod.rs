//! Repository Module
//!
//! Free functions over SQLite. Single-statement reads accept any executor
//! (`&SqlitePool` or `&mut *tx`); multi-statement writes take a
//! `&mut SqliteConnection` so callers decide the transaction boundary.

pub mod admin;
pub mod file_ref;
pub mod schedule;
pub mod staff;
pub mod time_log;

use serde_json::{Map, Value};
use shared::error::{AppError, ErrorCode};
use shared::models::FilterType;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use thiserror::Error;

use crate::storage::StorageError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{1}")]
    NotFound(ErrorCode, String),

    #[error("{1}")]
    Duplicate(ErrorCode, String),

    #[error("{1}")]
    InvalidValue(ErrorCode, String),

    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(String),
}

impl RepoError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RepoError::InvalidValue(ErrorCode::InvalidRequest, message.into())
    }
}

/// Unique-constraint names mapped to the error a client should see
const UNIQUE_CONSTRAINTS: [(&str, ErrorCode); 6] = [
    ("staff.aadhar", ErrorCode::AadharAlreadyRegistered),
    ("staff.registration_id", ErrorCode::RegistrationIdExists),
    ("schedule.name", ErrorCode::ScheduleNameExists),
    ("schedule_dayoff.", ErrorCode::DuplicateDayOff),
    ("admin.", ErrorCode::AlreadyExists),
    ("files.file_name", ErrorCode::AlreadyExists),
];

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let message = db_err.message().to_string();
            if db_err.is_unique_violation() {
                let code = UNIQUE_CONSTRAINTS
                    .iter()
                    .find(|(name, _)| message.contains(name))
                    .map(|(_, code)| *code)
                    .unwrap_or(ErrorCode::AlreadyExists);
                return RepoError::Duplicate(code, message);
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::InvalidValue(
                    ErrorCode::InvalidRequest,
                    format!("Referenced record does not exist: {message}"),
                );
            }
            if db_err.is_check_violation() {
                return RepoError::InvalidValue(ErrorCode::ValidationFailed, message);
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::MissingFields(fields) => AppError::required_fields(&fields),
            RepoError::NotFound(code, msg)
            | RepoError::Duplicate(code, msg)
            | RepoError::InvalidValue(code, msg) => AppError::with_message(code, msg),
            RepoError::Storage(e) => {
                tracing::error!(error = %e, "Object storage failure");
                AppError::storage(e.to_string())
            }
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Criteria fetch with projection
// =============================================================================

/// How a column is stored, for binding criteria and reading projections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Bool,
    Text,
}

/// A column that may appear in fetch criteria and projections
pub trait Column: Copy + 'static {
    fn name(&self) -> &'static str;
    fn kind(&self) -> ColumnKind;
}

/// `SELECT <fields> FROM <table> WHERE c1 = ? AND|OR c2 = ? ...`
///
/// Empty criteria match nothing. Rows come back as JSON objects holding
/// only the projected columns.
pub async fn fetch_projected<C: Column>(
    pool: &SqlitePool,
    table: &str,
    all_columns: &[C],
    criteria: &[(C, String)],
    filter_type: FilterType,
    first_only: bool,
    fields: Option<&[C]>,
) -> RepoResult<Vec<Map<String, Value>>> {
    if criteria.is_empty() {
        return Ok(Vec::new());
    }
    let projection = match fields {
        Some(f) if !f.is_empty() => f,
        _ => all_columns,
    };

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    let mut cols = qb.separated(", ");
    for col in projection {
        cols.push(col.name());
    }
    qb.push(" FROM ").push(table).push(" WHERE ");

    let joiner = match filter_type {
        FilterType::All => " AND ",
        FilterType::Any => " OR ",
    };
    for (i, (col, value)) in criteria.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        qb.push(col.name()).push(" = ");
        match col.kind() {
            ColumnKind::Integer => {
                let n: i64 = value.trim().parse().map_err(|_| {
                    RepoError::invalid(format!("{} must be an integer, got {value}", col.name()))
                })?;
                qb.push_bind(n);
            }
            ColumnKind::Bool => {
                qb.push_bind(parse_bool(value).ok_or_else(|| {
                    RepoError::invalid(format!("{} must be true or false, got {value}", col.name()))
                })?);
            }
            ColumnKind::Text => {
                qb.push_bind(value.clone());
            }
        }
    }
    qb.push(" ORDER BY id");
    if first_only {
        qb.push(" LIMIT 1");
    }

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter()
        .map(|row| project_row(row, projection))
        .collect::<RepoResult<Vec<_>>>()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn project_row<C: Column>(row: &SqliteRow, projection: &[C]) -> RepoResult<Map<String, Value>> {
    let mut map = Map::with_capacity(projection.len());
    for col in projection {
        let name = col.name();
        let value = match col.kind() {
            ColumnKind::Integer => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            ColumnKind::Bool => row.try_get::<Option<bool>, _>(name)?.map(Value::from),
            ColumnKind::Text => row.try_get::<Option<String>, _>(name)?.map(Value::from),
        };
        map.insert(name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(map)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory database with the real migrations applied.
    ///
    /// A single connection: every connection to `sqlite::memory:` is its own
    /// database.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_errors_map_to_app_errors() {
        let err: AppError = RepoError::MissingFields(vec!["name", "dob"]).into();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "Missing required fields: name, dob");

        let err: AppError = RepoError::Storage(StorageError::Upload {
            key: "staff/a.png".into(),
            message: "bucket offline".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::StorageUnavailable);
        assert_eq!(err.http_status(), http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message.contains("bucket offline"));

        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
