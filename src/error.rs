// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

use crate::media::MediaKind;

/// Errors raised by catalog repositories
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write catalog {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog document {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize catalog: {0}")]
    SerializeFailed(#[from] serde_json::Error),

    #[error("Episode {0} already exists in the catalog")]
    DuplicateId(String),
}

/// Errors raised while storing or removing uploaded media
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid {kind} file type")]
    InvalidType {
        kind: MediaKind,
        file_name: String,
        mime_type: Option<String>,
    },

    #[error("File too large. Maximum size is {}.", size_label(.limit))]
    TooLarge { limit: u64 },

    #[error("Failed to read upload stream: {source}")]
    StreamFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a stored media path: {0}")]
    InvalidPath(String),
}

/// Whole megabytes where possible, bytes below one MiB
fn size_label(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if *bytes >= MIB {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Errors raised while assembling an episode from an upload
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Audio file is required")]
    MissingAudio,

    #[error("Only one {0} file may be uploaded")]
    DuplicateFile(MediaKind),

    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Errors raised while rendering an episode feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to write RSS feed: {0}")]
    WriteFailed(#[from] rss::Error),

    #[error("RSS feed is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Errors raised by the access gate
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Unauthorized - No user ID provided")]
    MissingIdentity,

    #[error("Not authorized to delete podcast {id}")]
    NotOwner { id: String },
}

/// Top-level errors for catalog operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Podcast {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Errors raised while loading the server configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
