// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use async_trait::async_trait;

use super::query::sort_newest_first;
use crate::episode::Episode;
use crate::error::CatalogError;

/// Durable storage for the episode catalog
///
/// Backends only need to load and persist the whole collection; lookups and
/// mutations have read-modify-write defaults on top of those two. A
/// transactional backend can override the derived operations without
/// callers noticing.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load every record; an absent catalog is empty, not an error
    async fn load_all(&self) -> Result<Vec<Episode>, CatalogError>;

    /// Replace the stored catalog with `episodes`
    async fn persist_all(&self, episodes: &[Episode]) -> Result<(), CatalogError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Episode>, CatalogError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|episode| episode.id == id))
    }

    /// Records uploaded by `author_id`, newest first
    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Episode>, CatalogError> {
        let mut episodes: Vec<_> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|episode| episode.author_id == author_id)
            .collect();
        sort_newest_first(&mut episodes);
        Ok(episodes)
    }

    async fn append(&self, episode: Episode) -> Result<(), CatalogError> {
        let mut episodes = self.load_all().await?;
        if episodes.iter().any(|existing| existing.id == episode.id) {
            return Err(CatalogError::DuplicateId(episode.id));
        }
        episodes.push(episode);
        self.persist_all(&episodes).await
    }

    /// Remove a record, returning it if it existed
    async fn remove(&self, id: &str) -> Result<Option<Episode>, CatalogError> {
        let mut episodes = self.load_all().await?;
        let Some(index) = episodes.iter().position(|episode| episode.id == id) else {
            return Ok(None);
        };
        let removed = episodes.remove(index);
        self.persist_all(&episodes).await?;
        Ok(Some(removed))
    }
}

/// A shared reference to a catalog backend
pub type SharedCatalog = Arc<dyn CatalogRepository>;
