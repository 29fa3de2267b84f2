mod error;
mod path;
mod policy;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use path::{PUBLIC_PREFIX, PublicPath};
pub use policy::{UploadPolicy, UploadedFile};
pub use traits::{FileStore, StoredFile};
