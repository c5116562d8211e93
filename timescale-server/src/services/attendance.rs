//! Attendance Policy
//!
//! One time log per staff member per business day. The first submission of
//! a day opens the entry (subject to the shift window), later submissions on
//! the same day close or correct it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono_tz::Tz;
use shared::models::{AttendanceStatus, DayState, PunchOutcome, PunchRequest, TimeLog};
use sqlx::SqlitePool;

use super::file_store::{FileStore, Upload};
use crate::db::repository::staff::StaffKey;
use crate::db::repository::{RepoError, schedule, staff, time_log};
use crate::utils::time::{local_date, local_to_millis, parse_clock_time, same_local_day};
use crate::utils::validation::validate_picture;
use crate::utils::{AppError, AppResult, ErrorCode};

/// How far from the shift start a first clock-in may be
pub const SHIFT_WINDOW_MILLIS: i64 = 60 * 60 * 1000;

/// Key prefix for punch photos inside the images bucket
pub const PICTURE_PATH: &str = "timelogs";

#[derive(Clone)]
pub struct Attendance {
    pool: SqlitePool,
    files: FileStore,
    bucket: String,
    tz: Tz,
}

impl Attendance {
    pub fn new(pool: SqlitePool, files: FileStore, bucket: impl Into<String>, tz: Tz) -> Self {
        Self {
            pool,
            files,
            bucket: bucket.into(),
            tz,
        }
    }

    /// Record a clock submission for `staff_id` made at `now` (Unix millis)
    pub async fn punch(&self, staff_id: i64, req: &PunchRequest, now: i64) -> AppResult<PunchOutcome> {
        let member = staff::get(&self.pool, &StaffKey::Id(staff_id)).await?;

        // Malformed corrections count as not given
        let clock_in = req.clock_in.as_deref().and_then(|v| parse_clock_time(v, self.tz));
        let clock_out = req.clock_out.as_deref().and_then(|v| parse_clock_time(v, self.tz));
        let picture = req
            .picture
            .as_deref()
            .and_then(|data| decode_picture(data, staff_id));

        let today_entry = time_log::latest_for_staff(&self.pool, staff_id)
            .await?
            .filter(|log| log.clock_in.is_some_and(|ci| same_local_day(ci, now, self.tz)));

        let (entry, created) = match today_entry {
            Some(entry) => {
                let new_out = match (clock_in, clock_out) {
                    (None, None) => Some(now),
                    (_, out) => out,
                };
                ensure_order(clock_in.or(entry.clock_in), new_out.or(entry.clock_out))?;

                let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
                let picture_id = self.store_picture(&mut tx, picture.as_ref()).await?;
                let updated = time_log::update(&mut tx, entry.id, clock_in, new_out, picture_id).await?;
                // A new photo replaces the old one, row and object
                let stale = match (picture_id, entry.picture_id) {
                    (Some(_), Some(old)) => self.files.detach(&mut tx, &[old]).await?,
                    _ => Vec::new(),
                };
                tx.commit().await.map_err(RepoError::from)?;
                self.files.delete_objects(&stale).await;
                (updated, false)
            }
            None => {
                if let Some(schedule_id) = member.schedule_id {
                    self.check_shift_window(schedule_id, now).await?;
                }
                let opened_at = clock_in.unwrap_or(now);
                ensure_order(Some(opened_at), clock_out)?;

                let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
                let picture_id = self.store_picture(&mut tx, picture.as_ref()).await?;
                let inserted =
                    time_log::insert(&mut tx, staff_id, Some(opened_at), clock_out, picture_id).await?;
                tx.commit().await.map_err(RepoError::from)?;
                (inserted, true)
            }
        };

        tracing::info!(
            staff_id,
            time_log_id = entry.id,
            created,
            clocked_out = entry.clock_out.is_some(),
            "Attendance recorded"
        );
        Ok(PunchOutcome {
            created,
            state: day_state(&entry),
            entry,
        })
    }

    async fn check_shift_window(&self, schedule_id: i64, now: i64) -> AppResult<()> {
        let Some(shift) = schedule::find_by_id(&self.pool, schedule_id).await? else {
            return Ok(());
        };
        let Some(today) = local_date(now, self.tz) else {
            return Ok(());
        };
        let shift_start = local_to_millis(today, shift.shift_start, self.tz);
        if (now - shift_start).abs() > SHIFT_WINDOW_MILLIS {
            tracing::info!(schedule_id, now, shift_start, "Clock-in outside shift window");
            return Err(AppError::with_message(
                ErrorCode::ClockInOutsideShiftWindow,
                format!(
                    "Clock-in is only allowed within an hour of the shift start ({})",
                    shift.shift_start.format("%H:%M")
                ),
            ));
        }
        Ok(())
    }

    async fn store_picture(
        &self,
        conn: &mut sqlx::SqliteConnection,
        picture: Option<&Upload>,
    ) -> AppResult<Option<i64>> {
        Ok(self
            .files
            .add_file(conn, picture, &self.bucket, PICTURE_PATH)
            .await?
            .map(|f| f.id))
    }

    /// Where the staff member stands today
    pub async fn status(&self, staff_id: i64, now: i64) -> AppResult<AttendanceStatus> {
        staff::get(&self.pool, &StaffKey::Id(staff_id)).await?;
        let entry = time_log::latest_for_staff(&self.pool, staff_id)
            .await?
            .filter(|log| log.clock_in.is_some_and(|ci| same_local_day(ci, now, self.tz)));
        Ok(AttendanceStatus {
            state: entry.as_ref().map(day_state).unwrap_or(DayState::NoEntry),
            entry,
        })
    }

    /// Time logs of a staff member, newest first
    pub async fn history(&self, staff_id: i64, limit: Option<i64>) -> AppResult<Vec<TimeLog>> {
        staff::get(&self.pool, &StaffKey::Id(staff_id)).await?;
        // SQLite reads a negative LIMIT as no limit
        Ok(time_log::list_for_staff(&self.pool, staff_id, limit.unwrap_or(-1)).await?)
    }
}

fn day_state(entry: &TimeLog) -> DayState {
    if entry.clock_out.is_some() {
        DayState::ClockedOut
    } else {
        DayState::ClockedIn
    }
}

fn ensure_order(clock_in: Option<i64>, clock_out: Option<i64>) -> AppResult<()> {
    if let (Some(i), Some(o)) = (clock_in, clock_out)
        && o < i
    {
        return Err(AppError::new(ErrorCode::ClockOutBeforeClockIn));
    }
    Ok(())
}

/// Decode a `data:image/<type>;base64,<data>` URL into an upload.
///
/// Anything malformed, non-image or oversized is dropped.
fn decode_picture(data_url: &str, staff_id: i64) -> Option<Upload> {
    let parsed = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .and_then(|(header, payload)| {
            let mime = header.strip_suffix(";base64")?;
            let subtype = mime.strip_prefix("image/")?;
            let bytes = STANDARD.decode(payload.trim()).ok()?;
            Some((mime.to_string(), subtype.to_string(), bytes))
        });
    let Some((mime, subtype, bytes)) = parsed else {
        tracing::warn!(staff_id, "Dropping malformed punch picture");
        return None;
    };

    let file_name = format!("punch-{staff_id}.{subtype}");
    if let Err(e) = validate_picture(&file_name, bytes.len()) {
        tracing::warn!(staff_id, error = %e, "Dropping rejected punch picture");
        return None;
    }

    Some(Upload {
        file_name,
        content_type: Some(mime),
        bytes,
    })
}
