use common::StorageError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Outcome of a failed catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation. Nothing was written.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Stale version token, or the record still has dependents.
    #[error("{0}")]
    Conflict(String),
    /// The database or file store failed during an otherwise valid operation.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CatalogError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                CatalogError::Conflict(format!("Record is still referenced: {detail}"))
            }
            _ => CatalogError::Persistence(err.to_string()),
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        if err.is_rejection() {
            CatalogError::Validation {
                field: None,
                message: err.to_string(),
            }
        } else {
            CatalogError::Persistence(err.to_string())
        }
    }
}
