// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::CatalogRepository;
use crate::episode::Episode;
use crate::error::CatalogError;

/// Catalog kept in memory only, for tests and ephemeral instances
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    episodes: RwLock<Vec<Episode>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_episodes(episodes: Vec<Episode>) -> Self {
        Self {
            episodes: RwLock::new(episodes),
        }
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn load_all(&self) -> Result<Vec<Episode>, CatalogError> {
        Ok(self.episodes.read().await.clone())
    }

    async fn persist_all(&self, episodes: &[Episode]) -> Result<(), CatalogError> {
        *self.episodes.write().await = episodes.to_vec();
        Ok(())
    }
}
