// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::Utc;
use rss::extension::atom::{AtomExtensionBuilder, Link};
use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder,
};
use rss::{ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, ItemBuilder};

use crate::episode::Episode;
use crate::error::FeedError;

pub const FEED_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const FEED_MIME_TYPE: &str = "application/rss+xml";
pub const FEED_LANGUAGE: &str = "de-DE";

/// Enclosures always declare this type, whatever the stored container is
const ENCLOSURE_TYPE: &str = "audio/mpeg";

/// Render a single-item podcast feed for `episode`
///
/// `base_url` is the absolute origin the media and page links hang off,
/// e.g. `https://pods.example.org`. Text is escaped by the XML writer;
/// item descriptions are written as CDATA sections.
pub fn render_feed(episode: &Episode, base_url: &str) -> Result<String, FeedError> {
    let base_url = base_url.trim_end_matches('/');
    let page_url = format!("{}/podcast/{}", base_url, episode.id);
    let feed_url = format!("{}/api/podcasts/{}/feed", base_url, episode.id);
    let audio_url = format!("{}{}", base_url, episode.audio_url);
    let image_url = episode
        .image_url
        .as_ref()
        .map(|path| format!("{}{}", base_url, path));

    let channel_itunes = ITunesChannelExtensionBuilder::default()
        .author(Some(episode.author.clone()))
        .summary(Some(episode.description.clone()))
        .categories(vec![
            ITunesCategoryBuilder::default()
                .text(episode.category.clone())
                .build(),
        ])
        .explicit(Some("false".to_string()))
        .image(image_url.clone())
        .build();

    let item_itunes = ITunesItemExtensionBuilder::default()
        .duration(Some(episode.duration.clone()))
        .author(Some(episode.author.clone()))
        .summary(Some(episode.description.clone()))
        .image(image_url.clone())
        .build();

    let item = ItemBuilder::default()
        .title(Some(episode.title.clone()))
        .description(Some(episode.description.clone()))
        .pub_date(Some(episode.created_at.to_rfc2822()))
        .enclosure(Some(
            EnclosureBuilder::default()
                .url(audio_url)
                .length("0".to_string())
                .mime_type(ENCLOSURE_TYPE.to_string())
                .build(),
        ))
        .guid(Some(
            GuidBuilder::default()
                .value(episode.id.clone())
                .permalink(false)
                .build(),
        ))
        .link(Some(page_url.clone()))
        .itunes_ext(Some(item_itunes))
        .build();

    let image = image_url.map(|url| {
        ImageBuilder::default()
            .url(url)
            .title(episode.title.clone())
            .link(page_url.clone())
            .build()
    });

    let mut self_link = Link::default();
    self_link.set_href(feed_url);
    self_link.set_rel("self");
    self_link.set_mime_type(FEED_MIME_TYPE.to_string());
    let atom = AtomExtensionBuilder::default()
        .links(vec![self_link])
        .build();

    let channel = ChannelBuilder::default()
        .title(episode.title.clone())
        .link(page_url)
        .description(episode.description.clone())
        .language(Some(FEED_LANGUAGE.to_string()))
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .image(image)
        .itunes_ext(Some(channel_itunes))
        .atom_ext(Some(atom))
        .items(vec![item])
        .build();

    let xml = channel.write_to(Vec::new())?;
    Ok(String::from_utf8(xml)?)
}
