// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use super::kind::{MediaKind, file_extension};
use crate::error::MediaError;

/// URL prefix under which stored media is served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Per-file upload limit (500 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 500 * 1024 * 1024;

const PARTIAL_SUFFIX: &str = ".partial";

/// A file that has been written to the media store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub kind: MediaKind,
    /// Path relative to the public media root, e.g. `/uploads/audio/<id>.mp3`
    pub public_path: String,
    pub disk_path: PathBuf,
    pub bytes_written: u64,
}

/// Durable storage for uploaded audio and cover art
///
/// Every file gets a freshly generated name, so writes never collide and the
/// uploader's original file name never reaches the filesystem.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_file_bytes: u64,
}

impl MediaStore {
    /// Open the store, creating its directories and removing `.partial`
    /// files left behind by interrupted uploads.
    pub async fn open(root: impl Into<PathBuf>, max_file_bytes: u64) -> Result<Self, MediaError> {
        let store = Self {
            root: root.into(),
            max_file_bytes,
        };

        for kind in [MediaKind::Audio, MediaKind::Image] {
            let dir = store.kind_dir(kind);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| MediaError::CreateDirectoryFailed {
                    path: dir.clone(),
                    source: e,
                })?;
        }

        let cleaned = store.clean_partial_files().await?;
        if cleaned > 0 {
            info!(count = cleaned, "Removed partial uploads from {}", store.root.display());
        }

        Ok(store)
    }

    /// Directory that `/uploads` maps onto
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Validate and stream an upload to disk
    ///
    /// The body is written to `<name>.partial` and only renamed into place
    /// once fully flushed; on any failure the partial file is removed.
    pub async fn save<S, E>(
        &self,
        kind: MediaKind,
        stream: S,
        file_name: &str,
        mime_type: Option<&str>,
    ) -> Result<StoredMedia, MediaError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    {
        if !kind.accepts(mime_type, file_name) {
            return Err(MediaError::InvalidType {
                kind,
                file_name: file_name.to_string(),
                mime_type: mime_type.map(String::from),
            });
        }

        let stored_name = generate_stored_name(file_name);
        let disk_path = self.kind_dir(kind).join(&stored_name);
        let partial_path = self
            .kind_dir(kind)
            .join(format!("{stored_name}{PARTIAL_SUFFIX}"));

        let bytes_written = match self.write_stream(stream, &partial_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial_path).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial_path, &disk_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(MediaError::FileWriteFailed {
                path: disk_path,
                source: e,
            });
        }

        debug!(
            kind = %kind,
            bytes = bytes_written,
            "Stored {} as {}",
            file_name,
            disk_path.display()
        );

        Ok(StoredMedia {
            kind,
            public_path: format!("{PUBLIC_PREFIX}/{}/{stored_name}", kind.dir_name()),
            disk_path,
            bytes_written,
        })
    }

    /// Remove a stored file by its public path
    ///
    /// Returns whether a file was actually removed; a missing file is not an
    /// error.
    pub async fn delete(&self, public_path: &str) -> Result<bool, MediaError> {
        let path = self.resolve(public_path)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MediaError::DeleteFailed { path, source: e }),
        }
    }

    /// Map a public path such as `/uploads/audio/<name>` onto the disk
    ///
    /// Only paths of exactly that shape with a generated-looking name are
    /// accepted, so a tampered catalog cannot point outside the media root.
    pub fn resolve(&self, public_path: &str) -> Result<PathBuf, MediaError> {
        let invalid = || MediaError::InvalidPath(public_path.to_string());

        let rest = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (dir, name) = rest.split_once('/').ok_or_else(invalid)?;
        let kind = MediaKind::from_dir_name(dir).ok_or_else(invalid)?;

        if name.is_empty() || name.starts_with('.') || !name.chars().all(is_stored_name_char) {
            return Err(invalid());
        }

        Ok(self.kind_dir(kind).join(name))
    }

    /// Remove `.partial` files from all media directories
    pub async fn clean_partial_files(&self) -> Result<usize, MediaError> {
        let mut cleaned = 0;

        for kind in [MediaKind::Audio, MediaKind::Image] {
            let dir = self.kind_dir(kind);
            let mut entries =
                tokio::fs::read_dir(&dir)
                    .await
                    .map_err(|e| MediaError::ReadDirectoryFailed {
                        path: dir.clone(),
                        source: e,
                    })?;

            while let Some(entry) =
                entries
                    .next_entry()
                    .await
                    .map_err(|e| MediaError::ReadDirectoryFailed {
                        path: dir.clone(),
                        source: e,
                    })?
            {
                let is_partial = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));

                if is_partial && tokio::fs::remove_file(entry.path()).await.is_ok() {
                    cleaned += 1;
                }
            }
        }

        Ok(cleaned)
    }

    fn kind_dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    async fn write_stream<S, E>(&self, stream: S, path: &Path) -> Result<u64, MediaError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    {
        let mut file = File::create(path)
            .await
            .map_err(|e| MediaError::FileCreateFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut bytes_written: u64 = 0;
        let mut stream = std::pin::pin!(stream);

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| MediaError::StreamFailed { source: e.into() })?;

            bytes_written += chunk.len() as u64;
            if bytes_written > self.max_file_bytes {
                return Err(MediaError::TooLarge {
                    limit: self.max_file_bytes,
                });
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| MediaError::FileWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }

        file.flush()
            .await
            .map_err(|e| MediaError::FileWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(bytes_written)
    }
}

/// Random file name that keeps a sanitized copy of the original extension
fn generate_stored_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match file_extension(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn is_stored_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')
}
