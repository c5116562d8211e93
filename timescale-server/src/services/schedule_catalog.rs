//! Schedule Catalog

use serde_json::{Map, Value};
use shared::models::{Schedule, ScheduleCreate, ScheduleSearch, ScheduleUpdate, Staff};
use sqlx::SqlitePool;

use crate::db::repository::schedule::{NewSchedule, ScheduleChanges};
use crate::db::repository::staff::StaffKey;
use crate::db::repository::{RepoError, schedule, staff};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct ScheduleCatalog {
    pool: SqlitePool,
}

impl ScheduleCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, data: ScheduleCreate) -> AppResult<Schedule> {
        let mut missing = Vec::new();
        let name = data.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if name.is_none() {
            missing.push("name");
        }
        if data.shift_type.is_none() {
            missing.push("shift_type");
        }
        if data.shift_start.is_none() {
            missing.push("shift_start");
        }
        if data.shift_ends.is_none() {
            missing.push("shift_ends");
        }
        if data.dayoffs.is_none() {
            missing.push("dayoffs");
        }
        let (Some(name), Some(shift_type), Some(shift_start), Some(shift_ends), Some(dayoffs)) =
            (name, data.shift_type, data.shift_start, data.shift_ends, data.dayoffs)
        else {
            return Err(RepoError::MissingFields(missing).into());
        };

        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        self.ensure_name_free(&name, None).await?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let created = schedule::insert(
            &mut tx,
            &NewSchedule {
                name,
                shift_type,
                shift_start,
                shift_ends,
                dayoffs,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(schedule_id = created.id, name = %created.name, "Schedule created");
        Ok(created)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i64>) -> AppResult<()> {
        match schedule::find_by_name(&self.pool, name).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::with_message(
                ErrorCode::ScheduleNameExists,
                format!("Schedule {name} already exists"),
            )),
            _ => Ok(()),
        }
    }

    pub async fn get(&self, id: i64) -> AppResult<Schedule> {
        Ok(schedule::get_with_dayoffs(&self.pool, id).await?)
    }

    pub async fn fetch(&self, search: &ScheduleSearch) -> AppResult<Vec<Map<String, Value>>> {
        Ok(schedule::fetch(
            &self.pool,
            &search.criteria,
            search.filter_type,
            search.first_only,
            search.fields.as_deref(),
        )
        .await?)
    }

    pub async fn list(&self, with_references: bool) -> AppResult<Vec<Schedule>> {
        Ok(schedule::list(&self.pool, with_references).await?)
    }

    /// Apply changes; a `dayoffs` list replaces the stored set
    pub async fn update(&self, id: i64, data: ScheduleUpdate) -> AppResult<Schedule> {
        let current = schedule::get_with_dayoffs(&self.pool, id).await?;
        if data.is_empty() {
            tracing::warn!(schedule_id = id, "Schedule update carried no changes");
            return Ok(current);
        }

        let name = match data.name {
            Some(name) => {
                let name = name.trim().to_string();
                validate_required_text(&name, "name", MAX_NAME_LEN)?;
                self.ensure_name_free(&name, Some(id)).await?;
                Some(name)
            }
            None => None,
        };

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let updated = schedule::update(
            &mut tx,
            id,
            &ScheduleChanges {
                name,
                shift_type: data.shift_type,
                shift_start: data.shift_start,
                shift_ends: data.shift_ends,
                dayoffs: data.dayoffs,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(schedule_id = id, "Schedule updated");
        Ok(updated)
    }

    /// Delete a schedule; staff assigned to it are left without one
    pub async fn remove(&self, id: i64) -> AppResult<Schedule> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let existing = schedule::get(&mut *tx, id).await?;
        let assigned = staff::list_by_schedule(&mut *tx, id).await?.len();
        schedule::delete(&mut *tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(schedule_id = id, unassigned_staff = assigned, "Schedule removed");
        Ok(existing)
    }

    /// Set or clear the schedule a staff member works to
    pub async fn assign(&self, staff_id: i64, schedule_id: Option<i64>) -> AppResult<Staff> {
        let key = StaffKey::Id(staff_id);
        staff::get(&self.pool, &key).await?;
        if let Some(schedule_id) = schedule_id {
            schedule::get(&self.pool, schedule_id).await?;
        }
        staff::set_schedule(&self.pool, staff_id, schedule_id).await?;

        tracing::info!(staff_id, schedule_id = ?schedule_id, "Schedule assignment changed");
        Ok(staff::get(&self.pool, &key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use chrono::NaiveTime;
    use shared::models::{ShiftType, Weekday};

    fn night(name: &str) -> ScheduleCreate {
        ScheduleCreate {
            name: Some(name.into()),
            shift_type: Some(ShiftType::Night),
            shift_start: NaiveTime::from_hms_opt(22, 0, 0),
            shift_ends: NaiveTime::from_hms_opt(6, 0, 0),
            dayoffs: Some(vec![Weekday::Monday, Weekday::Tuesday]),
        }
    }

    #[tokio::test]
    async fn test_add_requires_every_field() {
        let catalog = ScheduleCatalog::new(test_pool().await);
        let err = catalog
            .add(ScheduleCreate {
                name: Some("Night".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(
            err.message,
            "Missing required fields: shift_type, shift_start, shift_ends, dayoffs"
        );
    }

    #[tokio::test]
    async fn test_dayoffs_replaced_on_update() {
        let catalog = ScheduleCatalog::new(test_pool().await);
        let created = catalog.add(night("Night")).await.unwrap();
        assert_eq!(created.dayoffs, Some(vec![Weekday::Monday, Weekday::Tuesday]));

        let updated = catalog
            .update(
                created.id,
                ScheduleUpdate {
                    dayoffs: Some(vec![Weekday::Friday]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.dayoffs, Some(vec![Weekday::Friday]));
        assert_eq!(catalog.get(created.id).await.unwrap().dayoffs, Some(vec![Weekday::Friday]));
    }

    #[tokio::test]
    async fn test_name_must_be_unique() {
        let catalog = ScheduleCatalog::new(test_pool().await);
        catalog.add(night("Night")).await.unwrap();
        let other = catalog.add(night("Late")).await.unwrap();
        assert_eq!(
            catalog.add(night("Night")).await.unwrap_err().code,
            ErrorCode::ScheduleNameExists
        );
        let err = catalog
            .update(
                other.id,
                ScheduleUpdate {
                    name: Some("Night".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ScheduleNameExists);
    }

    #[tokio::test]
    async fn test_update_and_remove_unknown() {
        let catalog = ScheduleCatalog::new(test_pool().await);
        assert_eq!(
            catalog.update(9, ScheduleUpdate::default()).await.unwrap_err().code,
            ErrorCode::ScheduleNotFound
        );
        assert_eq!(catalog.remove(9).await.unwrap_err().code, ErrorCode::ScheduleNotFound);
    }

    #[tokio::test]
    async fn test_assign_and_remove_keeps_staff() {
        let pool = test_pool().await;
        let catalog = ScheduleCatalog::new(pool.clone());
        let schedule = catalog.add(night("Night")).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let member = staff::insert(
            &mut conn,
            &crate::db::repository::staff::tests::sample("111122223333", "a@x.in"),
        )
        .await
        .unwrap();
        drop(conn);

        let assigned = catalog.assign(member.id, Some(schedule.id)).await.unwrap();
        assert_eq!(assigned.schedule_id, Some(schedule.id));
        assert_eq!(
            catalog.assign(member.id, Some(999)).await.unwrap_err().code,
            ErrorCode::ScheduleNotFound
        );
        assert_eq!(
            catalog.assign(999, None).await.unwrap_err().code,
            ErrorCode::StaffNotFound
        );

        catalog.remove(schedule.id).await.unwrap();
        let member = staff::get(&pool, &StaffKey::Id(member.id)).await.unwrap();
        assert_eq!(member.schedule_id, None);
    }
}
