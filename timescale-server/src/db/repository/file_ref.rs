//! File Reference Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::FileRef;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, bucket_name, file_path, file_name, file_uri, file_type, expired_at, created_at";

/// Row to insert, after the object has been written
#[derive(Debug, Clone)]
pub struct NewFileRef {
    pub bucket_name: String,
    pub file_path: String,
    pub file_name: String,
    pub file_uri: String,
    pub file_type: String,
    pub expired_at: i64,
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewFileRef) -> RepoResult<FileRef> {
    let now = shared::util::now_millis();
    let file = sqlx::query_as::<_, FileRef>(&format!(
        "INSERT INTO files (bucket_name, file_path, file_name, file_uri, file_type, expired_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {COLUMNS}"
    ))
    .bind(&data.bucket_name)
    .bind(&data.file_path)
    .bind(&data.file_name)
    .bind(&data.file_uri)
    .bind(&data.file_type)
    .bind(data.expired_at)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(file)
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<FileRef>> {
    let file = sqlx::query_as::<_, FileRef>(&format!("SELECT {COLUMNS} FROM files WHERE id = ?"))
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(file)
}

pub async fn get_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<FileRef> {
    find_by_id(ex, id).await?.ok_or_else(|| {
        RepoError::NotFound(ErrorCode::FileNotFound, format!("File with id: {id} doesn't exist!"))
    })
}

pub async fn find_by_ids<'e>(ex: impl SqliteExecutor<'e>, ids: &[i64]) -> RepoResult<Vec<FileRef>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM files WHERE id IN ("));
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    qb.push(") ORDER BY id");
    Ok(qb.build_query_as::<FileRef>().fetch_all(ex).await?)
}

pub async fn find_by_names<'e>(
    ex: impl SqliteExecutor<'e>,
    names: &[String],
) -> RepoResult<Vec<FileRef>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM files WHERE file_name IN ("));
    let mut list = qb.separated(", ");
    for name in names {
        list.push_bind(name.clone());
    }
    qb.push(") ORDER BY id");
    Ok(qb.build_query_as::<FileRef>().fetch_all(ex).await?)
}

/// References among `ids` whose URI expires before `deadline`
pub async fn find_expiring<'e>(
    ex: impl SqliteExecutor<'e>,
    ids: &[i64],
    deadline: i64,
) -> RepoResult<Vec<FileRef>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM files WHERE expired_at <= "
    ));
    qb.push_bind(deadline).push(" AND id IN (");
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    qb.push(") ORDER BY id");
    Ok(qb.build_query_as::<FileRef>().fetch_all(ex).await?)
}

pub async fn update_uri<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
    file_uri: &str,
    expired_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE files SET file_uri = ?1, expired_at = ?2 WHERE id = ?3")
        .bind(file_uri)
        .bind(expired_at)
        .bind(id)
        .execute(ex)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(
            ErrorCode::FileNotFound,
            format!("File with id: {id} doesn't exist!"),
        ));
    }
    Ok(())
}

/// Delete rows by id, returning how many went
pub async fn delete_by_ids<'e>(ex: impl SqliteExecutor<'e>, ids: &[i64]) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM files WHERE id IN (");
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    qb.push(")");
    Ok(qb.build().execute(ex).await?.rows_affected())
}
