//! Server state
//!
//! Cheap to clone: every field is a pool, an `Arc` or a service built from
//! those.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::core::config::StorageBackend;
use crate::db::DbService;
use crate::services::{Attendance, FileStore, ScheduleCatalog, StaffDirectory};
use crate::storage::{MemoryStore, S3Store, SharedObjectStore};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt: Arc<JwtService>,
    pub files: FileStore,
    pub staff: StaffDirectory,
    pub schedules: ScheduleCatalog,
    pub attendance: Attendance,
}

impl ServerState {
    /// Open the database and the configured object store
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_url).await?;
        let store: SharedObjectStore = match config.storage_backend {
            StorageBackend::S3 => Arc::new(S3Store::from_env(config.s3_endpoint.as_deref()).await),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory object storage, uploads are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::new(config, db.pool, store))
    }

    pub fn new(config: Config, pool: SqlitePool, store: SharedObjectStore) -> Self {
        let files = FileStore::new(store);
        let tz = config.business_timezone;
        let bucket = config.images_bucket.clone();
        Self {
            jwt: Arc::new(JwtService::with_config(config.jwt.clone())),
            staff: StaffDirectory::new(pool.clone(), files.clone(), bucket.clone(), tz),
            schedules: ScheduleCatalog::new(pool.clone()),
            attendance: Attendance::new(pool.clone(), files.clone(), bucket, tz),
            files,
            pool,
            config: Arc::new(config),
        }
    }
}
