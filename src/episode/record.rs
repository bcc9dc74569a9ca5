// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_DURATION: &str = "00:00";

/// A single podcast episode as persisted in the catalog
///
/// Records are immutable once created: there is no edit operation, only
/// creation through an upload and deletion by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_author")]
    pub author: String,
    pub author_id: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// `MM:SS` or `HH:MM:SS`, stored exactly as the uploader sent it
    #[serde(default = "default_duration")]
    pub duration: String,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Free-text fields supplied alongside an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
}

impl EpisodeFields {
    /// Record a form field by name, ignoring names that are not episode fields
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "author" => &mut self.author,
            "category" => &mut self.category,
            "duration" => &mut self.duration,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// The trimmed title, if one was supplied and is not blank
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }
}

impl Episode {
    /// Build a new record with a fresh id and creation time.
    ///
    /// Blank optional fields fall back to their defaults. The caller is
    /// responsible for having validated the title.
    pub fn new(
        title: &str,
        fields: EpisodeFields,
        author_id: &str,
        audio_url: String,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: fields.description.unwrap_or_default(),
            author: non_blank_or(fields.author, DEFAULT_AUTHOR),
            author_id: author_id.to_string(),
            category: non_blank_or(fields.category, DEFAULT_CATEGORY),
            duration: non_blank_or(fields.duration, DEFAULT_DURATION),
            audio_url,
            image_url,
            created_at: Utc::now(),
        }
    }

    /// Public paths of every media file this episode references
    pub fn media_paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.audio_url.as_str()).chain(self.image_url.as_deref())
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}
