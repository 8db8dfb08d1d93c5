use crate::types::{AggregatorError, RawItem, Result};
use feed_rs::parser;
use tracing::debug;

pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS, Atom or JSON Feed document into raw items, in document order.
    pub fn parse_feed(&self, content: &str) -> Result<Vec<RawItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        // feed-rs folds RSS <enclosure> into media content, so read enclosures on their own
        let mut enclosures = Self::rss_enclosures(content);
        if enclosures.len() != feed.entries.len() {
            enclosures = vec![None; feed.entries.len()];
        }

        let items: Vec<RawItem> = feed
            .entries
            .into_iter()
            .zip(enclosures)
            .map(|(entry, enclosure)| Self::parse_entry(entry, enclosure))
            .collect();

        debug!("Parsed feed with {} entries", items.len());
        Ok(items)
    }

    /// Enclosure URL per item of an RSS 2.0 document, in item order.
    /// Empty when the document is not RSS 2.0.
    fn rss_enclosures(content: &str) -> Vec<Option<String>> {
        match rss::Channel::read_from(content.as_bytes()) {
            Ok(channel) => channel
                .items()
                .iter()
                .map(|item| item.enclosure().map(|e| e.url().to_string()).and_then(non_empty))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn parse_entry(entry: feed_rs::model::Entry, rss_enclosure: Option<String>) -> RawItem {
        let title = entry.title.map(|t| t.content).and_then(non_empty);

        // Prefer the summary, fall back to the full content body
        let description = entry
            .summary
            .map(|s| s.content)
            .and_then(non_empty)
            .or_else(|| entry.content.and_then(|c| c.body).and_then(non_empty));

        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() != Some("enclosure"))
            .map(|l| l.href.clone())
            .and_then(non_empty);

        let enclosure = rss_enclosure.or_else(|| {
            entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("enclosure"))
                .map(|l| l.href.clone())
                .and_then(non_empty)
        });

        let media_content = entry
            .media
            .iter()
            .flat_map(|m| m.content.iter())
            .filter_map(|c| c.url.as_ref())
            .map(|u| u.to_string())
            .find(|u| !u.is_empty() && Some(u) != enclosure.as_ref());

        let media_thumbnail = entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|u| !u.is_empty());

        RawItem {
            title,
            description,
            link,
            published: entry.published.or(entry.updated),
            author: entry.authors.into_iter().next().map(|a| a.name).and_then(non_empty),
            source: entry.source.and_then(non_empty),
            media_content,
            media_thumbnail,
            enclosure,
        }
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
