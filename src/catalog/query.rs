// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Deserialize;

use crate::episode::Episode;

/// Category value the frontend uses for "no filter"
const ALL_CATEGORIES: &str = "All";

/// Optional filters for listing the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EpisodeQuery {
    /// Case-insensitive substring matched against title, description and author
    pub q: Option<String>,
    /// Exact category; `All` or empty disables the filter
    pub category: Option<String>,
}

impl EpisodeQuery {
    pub fn matches(&self, episode: &Episode) -> bool {
        self.matches_category(episode) && self.matches_text(episode)
    }

    /// Filter `episodes` and order the result newest first
    pub fn apply(&self, episodes: Vec<Episode>) -> Vec<Episode> {
        let mut matching: Vec<_> = episodes.into_iter().filter(|e| self.matches(e)).collect();
        sort_newest_first(&mut matching);
        matching
    }

    fn matches_category(&self, episode: &Episode) -> bool {
        match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(category) => episode.category == category,
        }
    }

    fn matches_text(&self, episode: &Episode) -> bool {
        let needle = match self.q.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(q) => q.to_lowercase(),
        };

        [&episode.title, &episode.description, &episode.author]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Sort by creation time, newest first; ties keep their catalog order
pub fn sort_newest_first(episodes: &mut [Episode]) {
    episodes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
