//! Time Log Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::TimeLog;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, staff_id, clock_in, clock_out, picture_id, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::NotFound(
        ErrorCode::TimeLogNotFound,
        format!("Time log with id: {id} doesn't exist!"),
    )
}

/// Most recently touched entry of a staff member
pub async fn latest_for_staff<'e>(
    ex: impl SqliteExecutor<'e>,
    staff_id: i64,
) -> RepoResult<Option<TimeLog>> {
    let log = sqlx::query_as::<_, TimeLog>(&format!(
        "SELECT {COLUMNS} FROM time_log WHERE staff_id = ? ORDER BY updated_at DESC, id DESC LIMIT 1"
    ))
    .bind(staff_id)
    .fetch_optional(ex)
    .await?;
    Ok(log)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    staff_id: i64,
    clock_in: Option<i64>,
    clock_out: Option<i64>,
    picture_id: Option<i64>,
) -> RepoResult<TimeLog> {
    let log = sqlx::query_as::<_, TimeLog>(&format!(
        "INSERT INTO time_log (staff_id, clock_in, clock_out, picture_id, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {COLUMNS}"
    ))
    .bind(staff_id)
    .bind(clock_in)
    .bind(clock_out)
    .bind(picture_id)
    .bind(shared::util::now_millis())
    .fetch_one(conn)
    .await?;
    Ok(log)
}

/// Overwrite the given times; `None` keeps the stored value
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    clock_in: Option<i64>,
    clock_out: Option<i64>,
    picture_id: Option<i64>,
) -> RepoResult<TimeLog> {
    let log = sqlx::query_as::<_, TimeLog>(&format!(
        "UPDATE time_log SET clock_in = COALESCE(?1, clock_in), clock_out = COALESCE(?2, clock_out), \
         picture_id = COALESCE(?3, picture_id), updated_at = ?4 WHERE id = ?5 RETURNING {COLUMNS}"
    ))
    .bind(clock_in)
    .bind(clock_out)
    .bind(picture_id)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    log.ok_or_else(|| not_found(id))
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<TimeLog>> {
    let log = sqlx::query_as::<_, TimeLog>(&format!("SELECT {COLUMNS} FROM time_log WHERE id = ?"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(log)
}

pub async fn get<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<TimeLog> {
    find_by_id(ex, id).await?.ok_or_else(|| not_found(id))
}

/// Entries of one staff member, newest first
pub async fn list_for_staff<'e>(
    ex: impl SqliteExecutor<'e>,
    staff_id: i64,
    limit: i64,
) -> RepoResult<Vec<TimeLog>> {
    let logs = sqlx::query_as::<_, TimeLog>(&format!(
        "SELECT {COLUMNS} FROM time_log WHERE staff_id = ?1 ORDER BY updated_at DESC, id DESC LIMIT ?2"
    ))
    .bind(staff_id)
    .bind(limit)
    .fetch_all(ex)
    .await?;
    Ok(logs)
}

/// Picture references held by a staff member's entries
pub async fn picture_ids_for_staff<'e>(
    ex: impl SqliteExecutor<'e>,
    staff_id: i64,
) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT picture_id FROM time_log WHERE staff_id = ? AND picture_id IS NOT NULL",
    )
    .bind(staff_id)
    .fetch_all(ex)
    .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::staff;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_insert_update_latest() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let member = staff::insert(&mut conn, &staff::tests::sample("111122223333", "a@x.in"))
            .await
            .unwrap();

        assert!(latest_for_staff(&mut *conn, member.id).await.unwrap().is_none());
        let first = insert(&mut conn, member.id, Some(1_000), None, None).await.unwrap();
        let second = insert(&mut conn, member.id, Some(90_000_000), None, None)
            .await
            .unwrap();
        let latest = latest_for_staff(&mut *conn, member.id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        let closed = update(&mut conn, first.id, None, Some(5_000), None).await.unwrap();
        assert_eq!(closed.clock_in, Some(1_000));
        assert_eq!(closed.clock_out, Some(5_000));

        assert!(matches!(
            update(&mut conn, 999, None, Some(1), None).await,
            Err(RepoError::NotFound(ErrorCode::TimeLogNotFound, _))
        ));
        drop(conn);

        let history = list_for_staff(&pool, member.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(get(&pool, first.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_clock_out_before_clock_in_violates_check() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let member = staff::insert(&mut conn, &staff::tests::sample("111122223333", "a@x.in"))
            .await
            .unwrap();
        let err = insert(&mut conn, member.id, Some(5_000), Some(1_000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidValue(ErrorCode::ValidationFailed, _)));
    }

    #[tokio::test]
    async fn test_entries_go_with_staff() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let member = staff::insert(&mut conn, &staff::tests::sample("111122223333", "a@x.in"))
            .await
            .unwrap();
        let log = insert(&mut conn, member.id, Some(1), None, None).await.unwrap();
        staff::delete(&mut *conn, member.id).await.unwrap();
        assert!(find_by_id(&mut *conn, log.id).await.unwrap().is_none());
        assert!(picture_ids_for_staff(&mut *conn, member.id).await.unwrap().is_empty());
    }
}
