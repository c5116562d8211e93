//! Schedule Repository
//!
//! Day-offs live in `schedule_dayoff`, one row per weekday, ordered by
//! `position`. Updating them always replaces the whole set.

use std::collections::HashMap;

use super::{Column, ColumnKind, RepoError, RepoResult, fetch_projected};
use chrono::NaiveTime;
use serde_json::{Map, Value};
use shared::error::ErrorCode;
use shared::models::{FilterType, Schedule, ScheduleField, ShiftType, Weekday};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, shift_type, shift_start, shift_ends, updated_at";

impl Column for ScheduleField {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn kind(&self) -> ColumnKind {
        if self.is_integer() {
            ColumnKind::Integer
        } else {
            ColumnKind::Text
        }
    }
}

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::NotFound(
        ErrorCode::ScheduleNotFound,
        format!("Schedule with id: {id} doesn't exist!"),
    )
}

/// Validated insert row
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub name: String,
    pub shift_type: ShiftType,
    pub shift_start: NaiveTime,
    pub shift_ends: NaiveTime,
    pub dayoffs: Vec<Weekday>,
}

/// Column changes; `None` leaves the column as is, `dayoffs` replaces all
#[derive(Debug, Clone, Default)]
pub struct ScheduleChanges {
    pub name: Option<String>,
    pub shift_type: Option<ShiftType>,
    pub shift_start: Option<NaiveTime>,
    pub shift_ends: Option<NaiveTime>,
    pub dayoffs: Option<Vec<Weekday>>,
}

/// Reject a day-off list that names a weekday twice
pub fn check_dayoffs(days: &[Weekday]) -> RepoResult<()> {
    for (i, day) in days.iter().enumerate() {
        if days[..i].contains(day) {
            return Err(RepoError::InvalidValue(
                ErrorCode::DuplicateDayOff,
                format!("Day off {day:?} listed more than once"),
            ));
        }
    }
    Ok(())
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewSchedule) -> RepoResult<Schedule> {
    check_dayoffs(&data.dayoffs)?;
    let now = shared::util::now_millis();
    let mut schedule = sqlx::query_as::<_, Schedule>(&format!(
        "INSERT INTO schedule (name, shift_type, shift_start, shift_ends, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(data.shift_type)
    .bind(data.shift_start)
    .bind(data.shift_ends)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    replace_dayoffs(conn, schedule.id, &data.dayoffs).await?;
    schedule.dayoffs = Some(data.dayoffs.clone());
    Ok(schedule)
}

async fn replace_dayoffs(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    days: &[Weekday],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM schedule_dayoff WHERE schedule_id = ?")
        .bind(schedule_id)
        .execute(&mut *conn)
        .await?;
    for (position, day) in days.iter().enumerate() {
        sqlx::query("INSERT INTO schedule_dayoff (schedule_id, day, position) VALUES (?1, ?2, ?3)")
            .bind(schedule_id)
            .bind(*day)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Schedule>> {
    let schedule =
        sqlx::query_as::<_, Schedule>(&format!("SELECT {COLUMNS} FROM schedule WHERE id = ?"))
            .bind(id)
            .fetch_optional(ex)
            .await?;
    Ok(schedule)
}

pub async fn get<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Schedule> {
    find_by_id(ex, id).await?.ok_or_else(|| not_found(id))
}

pub async fn find_by_name<'e>(
    ex: impl SqliteExecutor<'e>,
    name: &str,
) -> RepoResult<Option<Schedule>> {
    let schedule =
        sqlx::query_as::<_, Schedule>(&format!("SELECT {COLUMNS} FROM schedule WHERE name = ?"))
            .bind(name)
            .fetch_optional(ex)
            .await?;
    Ok(schedule)
}

/// Day-offs of one schedule in stored order
pub async fn dayoffs<'e>(ex: impl SqliteExecutor<'e>, schedule_id: i64) -> RepoResult<Vec<Weekday>> {
    let days = sqlx::query_scalar::<_, Weekday>(
        "SELECT day FROM schedule_dayoff WHERE schedule_id = ? ORDER BY position",
    )
    .bind(schedule_id)
    .fetch_all(ex)
    .await?;
    Ok(days)
}

/// Schedule with its day-offs attached
pub async fn get_with_dayoffs(pool: &SqlitePool, id: i64) -> RepoResult<Schedule> {
    let mut schedule = get(pool, id).await?;
    schedule.dayoffs = Some(dayoffs(pool, id).await?);
    Ok(schedule)
}

pub async fn fetch(
    pool: &SqlitePool,
    criteria: &[(ScheduleField, String)],
    filter_type: FilterType,
    first_only: bool,
    fields: Option<&[ScheduleField]>,
) -> RepoResult<Vec<Map<String, Value>>> {
    fetch_projected(
        pool,
        "schedule",
        &ScheduleField::ALL,
        criteria,
        filter_type,
        first_only,
        fields,
    )
    .await
}

/// All schedules; with references each carries its day-offs
pub async fn list(pool: &SqlitePool, with_references: bool) -> RepoResult<Vec<Schedule>> {
    let mut schedules =
        sqlx::query_as::<_, Schedule>(&format!("SELECT {COLUMNS} FROM schedule ORDER BY id"))
            .fetch_all(pool)
            .await?;
    if !with_references {
        return Ok(schedules);
    }

    let rows = sqlx::query_as::<_, (i64, Weekday)>(
        "SELECT schedule_id, day FROM schedule_dayoff ORDER BY schedule_id, position",
    )
    .fetch_all(pool)
    .await?;
    let mut by_schedule: HashMap<i64, Vec<Weekday>> = HashMap::new();
    for (schedule_id, day) in rows {
        by_schedule.entry(schedule_id).or_default().push(day);
    }
    for schedule in &mut schedules {
        schedule.dayoffs = Some(by_schedule.remove(&schedule.id).unwrap_or_default());
    }
    Ok(schedules)
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: &ScheduleChanges,
) -> RepoResult<Schedule> {
    if let Some(days) = &data.dayoffs {
        check_dayoffs(days)?;
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE schedule SET name = COALESCE(?1, name), shift_type = COALESCE(?2, shift_type), \
         shift_start = COALESCE(?3, shift_start), shift_ends = COALESCE(?4, shift_ends), \
         updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(data.shift_type)
    .bind(data.shift_start)
    .bind(data.shift_ends)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(days) = &data.dayoffs {
        replace_dayoffs(conn, id, days).await?;
    }

    let mut schedule = get(&mut *conn, id).await?;
    schedule.dayoffs = Some(dayoffs(&mut *conn, id).await?);
    Ok(schedule)
}

/// Delete the schedule and its day-offs; assigned staff keep their rows
/// with no schedule
pub async fn delete<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM schedule WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
