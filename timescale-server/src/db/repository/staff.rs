//! Staff Repository

use super::{Column, ColumnKind, RepoError, RepoResult, fetch_projected};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use shared::error::ErrorCode;
use shared::models::{FilterType, Gender, Staff, StaffField, StaffWithPicture};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, registration_id, name, email, dob, gender, mobile, alternate_mobile, address, pincode, city, password, picture_id, registration_date, aadhar, is_manager, schedule_id, updated_at";

impl Column for StaffField {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn kind(&self) -> ColumnKind {
        match self {
            StaffField::IsManager => ColumnKind::Bool,
            f if f.is_integer() => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }
}

/// Identity a staff member is addressed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffKey {
    Id(i64),
    RegistrationId(String),
}

impl std::fmt::Display for StaffKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffKey::Id(id) => write!(f, "id: {id}"),
            StaffKey::RegistrationId(rid) => write!(f, "registration_id: {rid}"),
        }
    }
}

pub(crate) fn not_found(key: &StaffKey) -> RepoError {
    RepoError::NotFound(
        ErrorCode::StaffNotFound,
        format!("Staff with {key} doesn't exist!"),
    )
}

/// Validated insert row (password already hashed)
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub registration_id: String,
    pub name: String,
    pub email: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub address: String,
    pub pincode: String,
    pub city: String,
    pub password_hash: String,
    pub picture_id: Option<i64>,
    pub aadhar: String,
    pub is_manager: bool,
    pub schedule_id: Option<i64>,
}

/// Column changes for an update; `None` leaves the column as is
#[derive(Debug, Clone, Default)]
pub struct StaffChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub mobile: Option<String>,
    /// `Some(None)` clears the number
    pub alternate_mobile: Option<Option<String>>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub password_hash: Option<String>,
    pub picture_id: Option<i64>,
    pub is_manager: Option<bool>,
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewStaff) -> RepoResult<Staff> {
    let now = shared::util::now_millis();
    let staff = sqlx::query_as::<_, Staff>(&format!(
        "INSERT INTO staff (registration_id, name, email, dob, gender, mobile, alternate_mobile, address, pincode, city, password, picture_id, registration_date, aadhar, is_manager, schedule_id, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?13) RETURNING {COLUMNS}"
    ))
    .bind(&data.registration_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(data.dob)
    .bind(data.gender)
    .bind(&data.mobile)
    .bind(data.alternate_mobile.as_deref())
    .bind(&data.address)
    .bind(&data.pincode)
    .bind(&data.city)
    .bind(&data.password_hash)
    .bind(data.picture_id)
    .bind(now)
    .bind(&data.aadhar)
    .bind(data.is_manager)
    .bind(data.schedule_id)
    .fetch_one(conn)
    .await?;
    Ok(staff)
}

pub async fn find<'e>(ex: impl SqliteExecutor<'e>, key: &StaffKey) -> RepoResult<Option<Staff>> {
    let staff = match key {
        StaffKey::Id(id) => {
            sqlx::query_as::<_, Staff>(&format!("SELECT {COLUMNS} FROM staff WHERE id = ?"))
                .bind(*id)
                .fetch_optional(ex)
                .await?
        }
        StaffKey::RegistrationId(rid) => {
            sqlx::query_as::<_, Staff>(&format!(
                "SELECT {COLUMNS} FROM staff WHERE registration_id = ?"
            ))
            .bind(rid)
            .fetch_optional(ex)
            .await?
        }
    };
    Ok(staff)
}

pub async fn get<'e>(ex: impl SqliteExecutor<'e>, key: &StaffKey) -> RepoResult<Staff> {
    find(ex, key).await?.ok_or_else(|| not_found(key))
}

/// First staff registered with `email`
pub async fn find_by_email<'e>(
    ex: impl SqliteExecutor<'e>,
    email: &str,
) -> RepoResult<Option<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(&format!(
        "SELECT {COLUMNS} FROM staff WHERE email = ? ORDER BY id LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(ex)
    .await?;
    Ok(staff)
}

/// Criteria lookup with optional projection; see [`fetch_projected`]
pub async fn fetch(
    pool: &SqlitePool,
    criteria: &[(StaffField, String)],
    filter_type: FilterType,
    first_only: bool,
    fields: Option<&[StaffField]>,
) -> RepoResult<Vec<Map<String, Value>>> {
    fetch_projected(
        pool,
        "staff",
        &StaffField::ALL,
        criteria,
        filter_type,
        first_only,
        fields,
    )
    .await
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(&format!("SELECT {COLUMNS} FROM staff ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(staff)
}

/// All staff with their picture reference flattened in
pub async fn list_with_pictures(pool: &SqlitePool) -> RepoResult<Vec<StaffWithPicture>> {
    let rows = sqlx::query_as::<_, StaffWithPicture>(
        "SELECT s.id, s.registration_id, s.name, s.email, s.dob, s.gender, s.mobile, s.alternate_mobile, \
                s.address, s.pincode, s.city, s.password, s.picture_id, s.registration_date, s.aadhar, \
                s.is_manager, s.schedule_id, s.updated_at, \
                f.bucket_name AS picture_bucket_name, f.file_path AS picture_file_path, \
                f.file_name AS picture_file_name, f.file_uri AS picture_file_uri, \
                f.file_type AS picture_file_type, f.expired_at AS picture_expired_at, \
                f.created_at AS picture_created_at \
         FROM staff s LEFT JOIN files f ON f.id = s.picture_id ORDER BY s.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_by_schedule<'e>(
    ex: impl SqliteExecutor<'e>,
    schedule_id: i64,
) -> RepoResult<Vec<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(&format!(
        "SELECT {COLUMNS} FROM staff WHERE schedule_id = ? ORDER BY id"
    ))
    .bind(schedule_id)
    .fetch_all(ex)
    .await?;
    Ok(staff)
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &StaffChanges) -> RepoResult<Staff> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE staff SET name = COALESCE(?1, name), email = COALESCE(?2, email), dob = COALESCE(?3, dob), \
         gender = COALESCE(?4, gender), mobile = COALESCE(?5, mobile), alternate_mobile = CASE WHEN ?15 THEN ?6 ELSE alternate_mobile END, \
         address = COALESCE(?7, address), pincode = COALESCE(?8, pincode), city = COALESCE(?9, city), \
         password = COALESCE(?10, password), picture_id = COALESCE(?11, picture_id), \
         is_manager = COALESCE(?12, is_manager), updated_at = ?13 WHERE id = ?14",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(data.dob)
    .bind(data.gender)
    .bind(&data.mobile)
    .bind(data.alternate_mobile.as_ref().and_then(|alt| alt.as_deref()))
    .bind(&data.address)
    .bind(&data.pincode)
    .bind(&data.city)
    .bind(&data.password_hash)
    .bind(data.picture_id)
    .bind(data.is_manager)
    .bind(now)
    .bind(id)
    .bind(data.alternate_mobile.is_some())
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(&StaffKey::Id(id)));
    }
    get(&mut *conn, &StaffKey::Id(id)).await
}

/// Set or clear the assigned schedule
pub async fn set_schedule<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
    schedule_id: Option<i64>,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE staff SET schedule_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(schedule_id)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(ex)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(&StaffKey::Id(id)));
    }
    Ok(())
}

/// Delete the row; time logs go with it through the foreign key
pub async fn delete<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM staff WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(&StaffKey::Id(id)));
    }
    Ok(())
}
