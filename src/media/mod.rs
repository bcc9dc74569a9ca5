mod kind;
mod store;

pub use kind::{MediaKind, file_extension};
pub use store::{DEFAULT_MAX_FILE_BYTES, MediaStore, PUBLIC_PREFIX, StoredMedia};
