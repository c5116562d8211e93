//! Object storage
//!
//! [`ObjectStore`] is the seam between the file reference store and the
//! bucket service. [`S3Store`] talks to S3 (or anything S3-compatible),
//! [`MemoryStore`] keeps objects in process for development and tests.

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("presigning {key} failed: {message}")]
    Presign { key: String, message: String },

    #[error("delete of {key} failed: {message}")]
    Delete { key: String, message: String },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` to `bucket/key`, replacing any existing object
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Time-limited GET URL for `bucket/key`
    async fn presign_get(&self, bucket: &str, key: &str, ttl: Duration)
    -> Result<String, StorageError>;

    /// Remove `bucket/key`; a missing object is not an error
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

pub type SharedObjectStore = Arc<dyn ObjectStore>;
