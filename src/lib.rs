pub mod access;
pub mod api;
pub mod catalog;
pub mod config;
pub mod episode;
pub mod error;
pub mod feed;
pub mod log;
pub mod media;
pub mod server;
pub mod upload;

// Re-export main types for convenience
pub use access::{IDENTITY_HEADER, Identity};
pub use api::{ApiError, AppState, router};
pub use catalog::{
    CatalogRepository, CatalogService, CorruptPolicy, EpisodeQuery, JsonFileCatalog,
    MemoryCatalog, SharedCatalog,
};
pub use config::Config;
pub use episode::{Episode, EpisodeFields};
pub use error::{
    AccessError, CatalogError, ConfigError, FeedError, MediaError, ServiceError, UploadError,
};
pub use feed::render_feed;
pub use media::{MediaKind, MediaStore, StoredMedia};
pub use upload::UploadDraft;
