pub mod storage;

pub use storage::{FileStore, PublicPath, StorageError, UploadPolicy, UploadedFile};
