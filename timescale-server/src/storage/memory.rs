//! In-process backend
//!
//! Keeps every object in a map and counts calls, so tests can assert on
//! how many writes an operation caused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ObjectStore, StorageError};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    puts: AtomicUsize,
    presigns: AtomicUsize,
    deletes: AtomicUsize,
    fail_puts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn presign_count(&self) -> usize {
        self.presigns.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Make subsequent uploads fail, to exercise rollback paths
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "uploads disabled".into(),
            });
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        let n = self.presigns.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "memory://{bucket}/{key}?expires_in={}&sig={n}",
            ttl.as_secs()
        ))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_presign_delete() {
        let store = MemoryStore::new();
        store
            .put("images", "a/b.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(store.put_count(), 1);
        assert_eq!(store.get("images", "a/b.png").await.unwrap().body, vec![1, 2, 3]);

        let first = store
            .presign_get("images", "a/b.png", Duration::from_secs(60))
            .await
            .unwrap();
        let second = store
            .presign_get("images", "a/b.png", Duration::from_secs(60))
            .await
            .unwrap();
        assert_ne!(first, second);

        store.delete("images", "a/b.png").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_failing_uploads() {
        let store = MemoryStore::new();
        store.fail_uploads(true);
        assert!(store.put("images", "x.png", vec![], "image/png").await.is_err());
        assert_eq!(store.put_count(), 0);
    }
}
