mod json_file;
mod memory;
mod query;
mod repository;
mod service;

pub use json_file::{CATALOG_FILENAME, JsonFileCatalog};
pub use memory::MemoryCatalog;
pub use query::{EpisodeQuery, sort_newest_first};
pub use repository::{CatalogRepository, SharedCatalog};
pub use service::{CatalogService, CorruptPolicy};
