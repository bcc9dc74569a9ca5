// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::query::EpisodeQuery;
use super::repository::SharedCatalog;
use crate::access::Identity;
use crate::episode::Episode;
use crate::error::{CatalogError, ServiceError};
use crate::media::MediaStore;
use crate::upload::UploadDraft;

/// What read operations do when the catalog cannot be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Log the failure and answer as if the catalog were empty
    #[default]
    Degrade,
    /// Fail the request
    Fail,
}

/// Catalog operations independent of the HTTP transport
///
/// Writes never fall back: a catalog that cannot be loaded is never
/// overwritten, whatever the read policy says.
pub struct CatalogService {
    catalog: SharedCatalog,
    media: MediaStore,
    on_corrupt: CorruptPolicy,
}

impl CatalogService {
    pub fn new(catalog: SharedCatalog, media: MediaStore) -> Self {
        Self {
            catalog,
            media,
            on_corrupt: CorruptPolicy::default(),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// All episodes matching `query`, newest first
    pub async fn list(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, ServiceError> {
        let episodes = self.read(self.catalog.load_all().await)?;
        Ok(query.apply(episodes))
    }

    /// Episodes uploaded by `author_id`, newest first
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<Episode>, ServiceError> {
        self.read(self.catalog.find_by_author(author_id).await)
    }

    pub async fn get(&self, id: &str) -> Result<Episode, ServiceError> {
        self.read(self.catalog.find_by_id(id).await)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Start collecting an upload whose files land in this service's media store
    pub fn begin_upload(&self) -> UploadDraft<'_> {
        UploadDraft::new(&self.media)
    }

    /// Validate a finished upload and add it to the catalog
    ///
    /// Media is already on disk when the record is appended, so the catalog
    /// never references a missing file. If the append fails the media is
    /// removed again.
    pub async fn create(
        &self,
        identity: &Identity,
        draft: UploadDraft<'_>,
    ) -> Result<Episode, ServiceError> {
        let episode = draft.finish(identity).await?;

        if let Err(e) = self.catalog.append(episode.clone()).await {
            self.remove_media(&episode).await;
            return Err(e.into());
        }

        info!(
            id = %episode.id,
            author_id = %episode.author_id,
            "Created episode '{}'",
            episode.title
        );
        Ok(episode)
    }

    /// Delete an episode and its media on behalf of its owner
    pub async fn delete(&self, identity: &Identity, id: &str) -> Result<Episode, ServiceError> {
        let episode = self
            .catalog
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        identity.ensure_owns(&episode)?;

        let removed = self
            .catalog
            .remove(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        self.remove_media(&removed).await;

        info!(id = %removed.id, "Deleted episode '{}'", removed.title);
        Ok(removed)
    }

    async fn remove_media(&self, episode: &Episode) {
        for path in episode.media_paths() {
            match self.media.delete(path).await {
                Ok(true) => {}
                Ok(false) => debug!("Media {} was already gone", path),
                Err(e) => warn!(id = %episode.id, "Orphaned media {}: {}", path, e),
            }
        }
    }

    fn read<T: Default>(&self, result: Result<T, CatalogError>) -> Result<T, ServiceError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if self.on_corrupt == CorruptPolicy::Degrade => {
                warn!("Catalog unavailable, answering with an empty result: {}", e);
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
