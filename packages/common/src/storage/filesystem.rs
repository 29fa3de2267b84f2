use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::error::StorageError;
use super::path::{PUBLIC_PREFIX, PublicPath};
use super::policy::{UploadPolicy, UploadedFile};
use super::traits::{FileStore, StoredFile};

/// Filesystem-backed upload store.
///
/// Files live at `{public_root}/uploads/{folder}/{uuid}{ext}` and are served
/// as `/uploads/{folder}/{uuid}{ext}`. Writes go through `{public_root}/.tmp`
/// and are renamed into place.
pub struct LocalFileStore {
    public_root: PathBuf,
}

impl LocalFileStore {
    /// Create a new store, creating the upload and staging directories.
    pub async fn new(public_root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let public_root = public_root.into();
        fs::create_dir_all(public_root.join(PUBLIC_PREFIX.trim_matches('/'))).await?;
        fs::create_dir_all(public_root.join(".tmp")).await?;
        Ok(Self { public_root })
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Directory holding every upload folder.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_root.join(PUBLIC_PREFIX.trim_matches('/'))
    }

    fn temp_path(&self) -> PathBuf {
        self.public_root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        file: &UploadedFile,
        policy: &UploadPolicy,
        folder: &str,
    ) -> Result<String, StorageError> {
        let extension = policy.check(file)?;
        let target = PublicPath::new(folder, &format!("{}{extension}", uuid::Uuid::new_v4()))?;
        let final_path = target.resolve(&self.public_root);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &file.data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = final_path.parent()
            && let Err(e) = fs::create_dir_all(parent).await
        {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %target, bytes = file.len(), "Stored upload");
        Ok(target.to_string())
    }

    async fn delete(&self, public_path: &str) -> bool {
        let target = match PublicPath::parse(public_path) {
            Ok(target) => target,
            Err(e) => {
                warn!(path = public_path, error = %e, "Refusing to delete unmanaged path");
                return false;
            }
        };

        match fs::remove_file(target.resolve(&self.public_root)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = public_path, "Upload already absent");
                false
            }
            Err(e) => {
                warn!(path = public_path, error = %e, "Failed to delete upload");
                false
            }
        }
    }

    async fn exists(&self, public_path: &str) -> Result<bool, StorageError> {
        let target = PublicPath::parse(public_path)?;
        Ok(fs::try_exists(target.resolve(&self.public_root)).await?)
    }

    async fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut files = Vec::new();
        let mut folders = fs::read_dir(self.uploads_dir()).await?;

        while let Some(folder) = folders.next_entry().await? {
            if !folder.file_type().await?.is_dir() {
                continue;
            }
            let Some(folder_name) = folder.file_name().to_str().map(str::to_owned) else {
                continue;
            };

            let mut entries = fs::read_dir(folder.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let meta = entry.metadata().await?;
                if !meta.is_file() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                let Ok(public_path) = PublicPath::new(&folder_name, &name) else {
                    continue;
                };
                files.push(StoredFile {
                    public_path: public_path.to_string(),
                    modified: meta.modified()?,
                });
            }
        }

        files.sort_by(|a, b| a.public_path.cmp(&b.public_path));
        Ok(files)
    }
}
