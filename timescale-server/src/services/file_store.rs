//! File Reference Store
//!
//! Uploads go to the object store first, then a `files` row records where
//! they live and a presigned URI for reading them. URIs last [`URI_TTL`] and
//! are renewed by [`FileStore::refresh_expiring`] once they come within
//! [`REFRESH_WINDOW`] of expiry.
//!
//! An object written before a failing row insert is left in the bucket.

use std::time::Duration;

use chrono::Utc;
use shared::models::{FileRef, file_ref::object_key};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoResult, file_ref};
use crate::db::repository::file_ref::NewFileRef;
use crate::storage::SharedObjectStore;
use crate::utils::validation::file_extension;

/// Lifetime of a presigned URI
pub const URI_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// URIs expiring within this window are renewed
pub const REFRESH_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded file as received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Empty or unnamed uploads are treated as no upload at all
    pub fn is_present(&self) -> bool {
        !self.bytes.is_empty() && !self.file_name.trim().is_empty()
    }
}

#[derive(Clone)]
pub struct FileStore {
    store: SharedObjectStore,
}

impl FileStore {
    pub fn new(store: SharedObjectStore) -> Self {
        Self { store }
    }

    /// Store an upload under `bucket/path` and record it.
    ///
    /// Returns `None` without touching storage when there is nothing to store.
    pub async fn add_file(
        &self,
        conn: &mut SqliteConnection,
        upload: Option<&Upload>,
        bucket: &str,
        path: &str,
    ) -> RepoResult<Option<FileRef>> {
        let Some(upload) = upload.filter(|u| u.is_present()) else {
            return Ok(None);
        };

        let file_name = generated_name(&upload.file_name);
        let file_type = mime_guess::from_path(&upload.file_name)
            .first_raw()
            .map(str::to_string)
            .or_else(|| upload.content_type.clone())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        let key = object_key(path, &file_name);

        self.store
            .put(bucket, &key, upload.bytes.clone(), &file_type)
            .await?;
        let file_uri = self.store.presign_get(bucket, &key, URI_TTL).await?;

        let file = file_ref::insert(
            conn,
            &NewFileRef {
                bucket_name: bucket.to_string(),
                file_path: path.trim_matches('/').to_string(),
                file_name,
                file_uri,
                file_type,
                expired_at: expiry_from_now(),
            },
        )
        .await?;

        tracing::info!(file_id = file.id, bucket, key = %key, "File stored");
        Ok(Some(file))
    }

    /// Renew the URI of every reference among `ids` that is about to expire.
    ///
    /// Returns how many were renewed. Never writes objects.
    pub async fn refresh_expiring(&self, conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<usize> {
        let deadline = Utc::now().timestamp_millis() + REFRESH_WINDOW.as_millis() as i64;
        let expiring = file_ref::find_expiring(&mut *conn, ids, deadline).await?;

        for file in &expiring {
            let uri = self
                .store
                .presign_get(&file.bucket_name, &file.object_key(), URI_TTL)
                .await?;
            file_ref::update_uri(&mut *conn, file.id, &uri, expiry_from_now()).await?;
        }

        if !expiring.is_empty() {
            tracing::debug!(count = expiring.len(), "Refreshed file URIs");
        }
        Ok(expiring.len())
    }

    /// One reference with a URI that is good for at least [`REFRESH_WINDOW`]
    pub async fn get(&self, pool: &SqlitePool, id: i64) -> RepoResult<FileRef> {
        let mut conn = pool.acquire().await?;
        self.refresh_expiring(&mut conn, &[id]).await?;
        file_ref::get_by_id(&mut *conn, id).await
    }

    /// Delete the named files, rows and objects.
    ///
    /// Any storage failure rolls the row deletes back. Unknown names are ignored.
    pub async fn remove(&self, pool: &SqlitePool, file_names: &[String]) -> RepoResult<usize> {
        let mut tx = pool.begin().await?;
        let files = file_ref::find_by_names(&mut *tx, file_names).await?;
        self.remove_in(tx, files).await
    }

    /// Same as [`FileStore::remove`], keyed by id
    pub async fn remove_by_ids(&self, pool: &SqlitePool, ids: &[i64]) -> RepoResult<usize> {
        let mut tx = pool.begin().await?;
        let files = file_ref::find_by_ids(&mut *tx, ids).await?;
        self.remove_in(tx, files).await
    }

    async fn remove_in(
        &self,
        mut tx: sqlx::Transaction<'_, sqlx::Sqlite>,
        files: Vec<FileRef>,
    ) -> RepoResult<usize> {
        if files.is_empty() {
            return Ok(0);
        }
        let ids: Vec<i64> = files.iter().map(|f| f.id).collect();
        file_ref::delete_by_ids(&mut *tx, &ids).await?;
        for file in &files {
            self.store.delete(&file.bucket_name, &file.object_key()).await?;
        }
        tx.commit().await?;

        tracing::info!(count = files.len(), "Files removed");
        Ok(files.len())
    }

    /// Delete rows inside the caller's transaction, handing back what went so
    /// the objects can be dropped once the transaction commits
    pub async fn detach(&self, conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<Vec<FileRef>> {
        let files = file_ref::find_by_ids(&mut *conn, ids).await?;
        let found: Vec<i64> = files.iter().map(|f| f.id).collect();
        file_ref::delete_by_ids(&mut *conn, &found).await?;
        Ok(files)
    }

    /// Best-effort object cleanup after a committed delete
    pub async fn delete_objects(&self, files: &[FileRef]) {
        for file in files {
            if let Err(e) = self.store.delete(&file.bucket_name, &file.object_key()).await {
                tracing::warn!(file_id = file.id, error = %e, "Failed to delete stored object");
            }
        }
    }
}

fn expiry_from_now() -> i64 {
    Utc::now().timestamp_millis() + URI_TTL.as_millis() as i64
}

/// `<timestamp>-<random>.<ext>` so two uploads of `photo.jpg` never collide
fn generated_name(original: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let suffix: u32 = rand::random();
    match file_extension(original) {
        Some(ext) => format!("{stamp}-{suffix:08x}.{ext}"),
        None => format!("{stamp}-{suffix:08x}"),
    }
}
