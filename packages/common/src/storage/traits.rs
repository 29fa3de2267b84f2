use std::time::SystemTime;

use async_trait::async_trait;

use super::error::StorageError;
use super::policy::{UploadPolicy, UploadedFile};

/// A stored file as seen by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub public_path: String,
    pub modified: SystemTime,
}

/// Storage for publicly served uploads.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Validates `file` against `policy`, stores it under a fresh unique name
    /// inside `folder`, and returns its public path.
    ///
    /// A file is either fully stored under its final name or not at all.
    async fn put(
        &self,
        file: &UploadedFile,
        policy: &UploadPolicy,
        folder: &str,
    ) -> Result<String, StorageError>;

    /// Removes a previously stored file.
    ///
    /// Returns `true` if the file was removed and `false` if it was missing,
    /// unmanaged, or could not be removed. Never fails.
    async fn delete(&self, public_path: &str) -> bool;

    /// Check whether a stored file exists.
    async fn exists(&self, public_path: &str) -> Result<bool, StorageError>;

    /// All stored files across every folder.
    async fn list(&self) -> Result<Vec<StoredFile>, StorageError>;
}
