// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use super::repository::CatalogRepository;
use crate::episode::Episode;
use crate::error::CatalogError;

pub const CATALOG_FILENAME: &str = "podcasts.json";

/// On-disk shape of the catalog document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    podcasts: Vec<Episode>,
}

#[derive(Serialize)]
struct CatalogDocumentRef<'a> {
    podcasts: &'a [Episode],
}

/// Catalog stored as a single pretty-printed JSON document
///
/// Every mutation rewrites the whole document through a temporary file and
/// a rename, so readers never observe a half-written catalog. Mutations
/// within this process are serialized; separate processes sharing the file
/// are not coordinated.
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Catalog stored as `podcasts.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(CATALOG_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty catalog document if none exists yet
    pub async fn ensure_exists(&self) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;

        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| CatalogError::ReadFailed {
                path: self.path.clone(),
                source: e,
            })?;

        if !exists {
            self.write_document(&[]).await?;
            info!("Created empty catalog at {}", self.path.display());
        }

        Ok(())
    }

    async fn read_document(&self) -> Result<Vec<Episode>, CatalogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CatalogError::ReadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let document: CatalogDocument =
            serde_json::from_str(&content).map_err(|e| CatalogError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;

        Ok(document.podcasts)
    }

    /// Write the document atomically; callers must hold `write_lock`
    async fn write_document(&self, episodes: &[Episode]) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&CatalogDocumentRef { podcasts: episodes })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::WriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| CatalogError::WriteFailed {
                path: tmp_path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| CatalogError::WriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| CATALOG_FILENAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CatalogRepository for JsonFileCatalog {
    async fn load_all(&self) -> Result<Vec<Episode>, CatalogError> {
        self.read_document().await
    }

    async fn persist_all(&self, episodes: &[Episode]) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;
        self.write_document(episodes).await
    }

    async fn append(&self, episode: Episode) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;

        let mut episodes = self.read_document().await?;
        if episodes.iter().any(|existing| existing.id == episode.id) {
            return Err(CatalogError::DuplicateId(episode.id));
        }
        episodes.push(episode);
        self.write_document(&episodes).await
    }

    async fn remove(&self, id: &str) -> Result<Option<Episode>, CatalogError> {
        let _guard = self.write_lock.lock().await;

        let mut episodes = self.read_document().await?;
        let Some(index) = episodes.iter().position(|episode| episode.id == id) else {
            return Ok(None);
        };
        let removed = episodes.remove(index);
        self.write_document(&episodes).await?;
        Ok(Some(removed))
    }
}
