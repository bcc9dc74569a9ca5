// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// Longest extension carried over from an uploaded file name
const MAX_EXTENSION_LENGTH: usize = 10;

/// The kinds of media an episode can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    /// Multipart field name carrying this kind of file
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }

    /// Subdirectory of the media root holding this kind of file
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "images",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "audio" => Some(MediaKind::Audio),
            "images" => Some(MediaKind::Image),
            _ => None,
        }
    }

    /// Check an upload against the allow-list for this kind
    ///
    /// Audio is accepted by MIME type or, failing that, by file extension,
    /// since browsers often send `application/octet-stream` for audio.
    /// Images are accepted by MIME type only.
    pub fn accepts(self, mime_type: Option<&str>, file_name: &str) -> bool {
        let mime = mime_type.map(essence).unwrap_or_default();
        match self {
            MediaKind::Audio => {
                is_audio_mime(&mime)
                    || file_extension(file_name).is_some_and(|ext| is_audio_extension(&ext))
            }
            MediaKind::Image => is_image_mime(&mime),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Extract a safe extension from an uploaded file name
///
/// Only the final path component is considered, and the extension must be
/// short and purely ASCII alphanumeric. Anything else yields `None` so a
/// crafted name can never influence where a file is written.
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LENGTH {
        return None;
    }

    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_string())
}

/// Lowercased MIME type without parameters
fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_lowercase()
}

fn is_audio_mime(mime: &str) -> bool {
    matches!(
        mime,
        "audio/mpeg"
            | "audio/mp3"
            | "audio/wav"
            | "audio/m4a"
            | "audio/x-m4a"
            | "audio/ogg"
            | "audio/flac"
    )
}

fn is_audio_extension(ext: &str) -> bool {
    matches!(
        ext.to_lowercase().as_str(),
        "mp3" | "wav" | "m4a" | "ogg" | "flac"
    )
}

fn is_image_mime(mime: &str) -> bool {
    matches!(mime, "image/jpeg" | "image/png" | "image/gif" | "image/webp")
}
