use thiserror::Error;

/// Errors raised while accepting, storing or removing uploaded files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The referenced file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file extension is not in the allowed set.
    #[error("file type '{extension}' is not allowed for '{file_name}'")]
    InvalidExtension {
        file_name: String,
        extension: String,
    },
    /// The file exceeds the configured size limit.
    #[error("'{file_name}' exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge {
        file_name: String,
        actual: u64,
        limit: u64,
    },
    /// The file has no content.
    #[error("'{0}' is empty")]
    EmptyFile(String),
    /// A folder name or public path is malformed or escapes the upload root.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    /// True for errors caused by the uploaded content rather than the store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidExtension { .. } | Self::TooLarge { .. } | Self::EmptyFile(_)
        )
    }
}
