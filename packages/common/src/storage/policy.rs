use std::path::Path;

use serde::Deserialize;

use super::error::StorageError;

/// 5 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// A file received from a client, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name. Only its extension is ever used.
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which uploads are accepted: an extension allow-list and a per-file byte cap.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadPolicy {
    /// Lower-case extensions including the leading dot, e.g. `.jpg`.
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: [".jpg", ".jpeg", ".png", ".gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Checks a file against the policy and returns its normalized extension.
    ///
    /// A file of exactly `max_bytes` is accepted.
    pub fn check(&self, file: &UploadedFile) -> Result<String, StorageError> {
        if file.is_empty() {
            return Err(StorageError::EmptyFile(file.file_name.clone()));
        }

        let extension = extension_of(&file.file_name);
        let allowed = self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension));
        if extension.is_empty() || !allowed {
            return Err(StorageError::InvalidExtension {
                file_name: file.file_name.clone(),
                extension,
            });
        }

        if file.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                file_name: file.file_name.clone(),
                actual: file.len(),
                limit: self.max_bytes,
            });
        }

        Ok(extension)
    }
}

/// Lower-cased extension with its leading dot, or an empty string.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
