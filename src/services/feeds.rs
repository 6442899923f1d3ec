// src/services/feeds.rs

//! Feed document parsing.
//!
//! Handles both RSS (`<item>`) and Atom (`<entry>`) documents, extracting
//! the title and link of every entry.

use serde::Deserialize;

use crate::error::Result;
use crate::models::FeedItem;

/// Returns true when a response looks like a feed document rather than an
/// HTML page.
///
/// The Content-Type header is checked first; bodies are sniffed as a
/// fallback for servers that mislabel their feeds.
pub fn looks_like_feed(content_type: &str, body: &str) -> bool {
    if content_type.contains("xml") && !content_type.contains("xhtml") {
        return true;
    }
    let head = body.trim_start();
    head.starts_with("<?xml") || head.starts_with("<rss") || head.starts_with("<feed")
}

/// Parse a feed document into its entries.
///
/// RSS is tried first, then Atom. Entries missing a title or link yield
/// empty strings rather than being skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    match quick_xml::de::from_str::<Rss>(xml) {
        Ok(rss) => Ok(rss.channel.items.into_iter().map(FeedItem::from).collect()),
        Err(_) => {
            let feed: AtomFeed = quick_xml::de::from_str(xml)?;
            Ok(feed.entries.into_iter().map(FeedItem::from).collect())
        }
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

impl From<RssItem> for FeedItem {
    fn from(item: RssItem) -> Self {
        Self {
            title: item.title.trim().to_string(),
            link: item.link.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default, rename = "entry")]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: AtomText,
    #[serde(default, rename = "link")]
    links: Vec<AtomLink>,
}

/// Atom text construct; attributes like `type` are ignored.
#[derive(Debug, Default, Deserialize)]
struct AtomText {
    #[serde(default, rename = "$text")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct AtomLink {
    #[serde(default, rename = "@href")]
    href: String,
    #[serde(default, rename = "@rel")]
    rel: String,
}

impl From<AtomEntry> for FeedItem {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.is_empty() || l.rel == "alternate")
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone())
            .unwrap_or_default();
        Self {
            title: entry.title.value.trim().to_string(),
            link: link.trim().to_string(),
        }
    }
}
