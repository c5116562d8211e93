//! File Reference Model

use serde::{Deserialize, Serialize};

/// Metadata row for an object held in object storage.
///
/// `file_uri` is a presigned GET URL; it stops working at `expired_at`
/// (Unix millis) and has to be refreshed before then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FileRef {
    pub id: i64,
    pub bucket_name: String,
    /// Key prefix inside the bucket, empty for the bucket root
    pub file_path: String,
    pub file_name: String,
    pub file_uri: String,
    pub file_type: String,
    pub expired_at: i64,
    pub created_at: i64,
}

impl FileRef {
    /// Object key: `file_path/file_name`, or just the name at the root
    pub fn object_key(&self) -> String {
        object_key(&self.file_path, &self.file_name)
    }
}

/// Body for `DELETE /api/files`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRemoval {
    pub file_names: Vec<String>,
}

/// How many files a removal deleted
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilesRemoved {
    pub removed: usize,
}

pub fn object_key(path: &str, name: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}/{name}")
    }
}
