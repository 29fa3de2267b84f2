use std::fmt;
use std::path::{Path, PathBuf};

use super::error::StorageError;

/// Every stored file is addressed by a path under this prefix.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// A parsed `/uploads/<folder>/<name>` reference.
///
/// Both segments are flat names, so the path can never resolve outside the
/// upload root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicPath {
    folder: String,
    name: String,
}

impl PublicPath {
    pub fn new(folder: &str, name: &str) -> Result<Self, StorageError> {
        Ok(Self {
            folder: flat_segment(folder)?.to_string(),
            name: flat_segment(name)?.to_string(),
        })
    }

    /// Parses a stored public path. External URLs and anything outside the
    /// upload prefix are rejected.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let rest = raw
            .strip_prefix(PUBLIC_PREFIX)
            .ok_or_else(|| StorageError::InvalidPath(raw.to_string()))?;
        let (folder, name) = rest
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidPath(raw.to_string()))?;
        Self::new(folder, name).map_err(|_| StorageError::InvalidPath(raw.to_string()))
    }

    /// Whether a stored string refers to a locally managed upload.
    pub fn is_managed(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location on disk relative to the public root.
    pub fn resolve(&self, public_root: &Path) -> PathBuf {
        public_root
            .join(PUBLIC_PREFIX.trim_matches('/'))
            .join(&self.folder)
            .join(&self.name)
    }
}

impl fmt::Display for PublicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PUBLIC_PREFIX}{}/{}", self.folder, self.name)
    }
}

fn flat_segment(segment: &str) -> Result<&str, StorageError> {
    let invalid = || StorageError::InvalidPath(segment.to_string());

    if segment.is_empty() || segment.starts_with('.') {
        return Err(invalid());
    }
    if segment
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_ascii_control() || c.is_whitespace())
    {
        return Err(invalid());
    }
    Ok(segment)
}
