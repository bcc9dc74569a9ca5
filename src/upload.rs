// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use futures::Stream;
use tracing::warn;

use crate::access::Identity;
use crate::episode::{Episode, EpisodeFields};
use crate::error::UploadError;
use crate::media::{MediaKind, MediaStore, StoredMedia};

/// An episode upload being assembled from a multipart request
///
/// Files are streamed into the media store as their parts arrive. Nothing
/// references them until [`UploadDraft::finish`] succeeds, and every
/// failure path removes them again, so a rejected upload leaves no files
/// behind.
#[derive(Debug)]
pub struct UploadDraft<'a> {
    media: &'a MediaStore,
    fields: EpisodeFields,
    audio: Option<StoredMedia>,
    image: Option<StoredMedia>,
}

impl<'a> UploadDraft<'a> {
    pub fn new(media: &'a MediaStore) -> Self {
        Self {
            media,
            fields: EpisodeFields::default(),
            audio: None,
            image: None,
        }
    }

    /// Record a text field; unknown names are ignored
    pub fn set_field(&mut self, name: &str, value: String) {
        self.fields.set(name, value);
    }

    /// Validate and store a file part
    pub async fn attach<S, E>(
        &mut self,
        kind: MediaKind,
        stream: S,
        file_name: &str,
        mime_type: Option<&str>,
    ) -> Result<(), UploadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    {
        if self.slot(kind).is_some() {
            return Err(UploadError::DuplicateFile(kind));
        }

        let stored = self.media.save(kind, stream, file_name, mime_type).await?;
        *self.slot(kind) = Some(stored);
        Ok(())
    }

    /// Turn the draft into a catalog record owned by `identity`
    ///
    /// On validation failure any stored media is removed before returning.
    pub async fn finish(mut self, identity: &Identity) -> Result<Episode, UploadError> {
        let Some(title) = self.fields.title().map(String::from) else {
            self.discard().await;
            return Err(UploadError::MissingTitle);
        };

        let Some(audio) = self.audio.take() else {
            self.discard().await;
            return Err(UploadError::MissingAudio);
        };

        let image_url = self.image.take().map(|image| image.public_path);

        Ok(Episode::new(
            &title,
            self.fields,
            identity.as_str(),
            audio.public_path,
            image_url,
        ))
    }

    /// Remove every file stored so far
    pub async fn discard(self) {
        for stored in [self.audio, self.image].into_iter().flatten() {
            if let Err(e) = self.media.delete(&stored.public_path).await {
                warn!("Failed to remove abandoned upload {}: {}", stored.public_path, e);
            }
        }
    }

    fn slot(&mut self, kind: MediaKind) -> &mut Option<StoredMedia> {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Image => &mut self.image,
        }
    }
}
