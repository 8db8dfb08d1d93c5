use crate::config::{NewsConfig, SectorRule};
use crate::rss_utils::{feed, id, url};
use crate::traits::Clock;
use crate::types::{Article, RawItem};
use chrono::SecondsFormat;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Turns raw feed items into deduplicated, classified articles.
pub struct Enricher {
    companies: Vec<String>,
    sectors: Vec<SectorRule>,
    description_limit: usize,
    max_articles: usize,
    clock: Arc<dyn Clock>,
}

impl Enricher {
    pub fn new(config: &NewsConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            companies: config.companies.clone(),
            sectors: config.sectors.clone(),
            description_limit: config.description_limit,
            max_articles: config.max_articles,
            clock,
        }
    }

    /// Dedupe by exact title (first occurrence wins), enrich, sort newest first and cap.
    pub fn enrich(&self, raw_items: Vec<RawItem>, scope: Option<&str>) -> Vec<Article> {
        let total = raw_items.len();
        let mut seen_titles = HashSet::new();
        let mut articles = Vec::new();

        for item in raw_items {
            let Some(title) = item.title.clone() else {
                continue;
            };
            if !seen_titles.insert(title.clone()) {
                debug!("Skipping duplicate title: {}", title);
                continue;
            }
            articles.push(self.build_article(title, item, scope));
        }

        // Stable, so equal timestamps keep first-seen order
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(self.max_articles);

        debug!("Enriched {} raw items into {} articles", total, articles.len());
        articles
    }

    fn build_article(&self, title: String, item: RawItem, scope: Option<&str>) -> Article {
        let raw_description = item.description.unwrap_or_default();
        let haystack = format!("{} {}", title, raw_description).to_lowercase();

        let published_at = item.published.unwrap_or_else(|| self.clock.now());
        let published = published_at.to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let source = item
            .source
            .or_else(|| item.link.as_deref().and_then(url::source_host))
            .unwrap_or_else(|| "Unknown".to_string());

        let image_url = [item.media_content, item.media_thumbnail, item.enclosure]
            .into_iter()
            .flatten()
            .find(|u| !u.is_empty());

        Article {
            id: id::article_id(&title, &published),
            description: feed::clean_description(&raw_description, self.description_limit),
            url: item.link.unwrap_or_default(),
            source,
            published_at,
            author: item.author,
            company: self.match_company(&haystack),
            country: scope.map(str::to_string),
            sector: self.match_sector(&haystack),
            image_url,
            title,
        }
    }

    fn match_company(&self, haystack_lower: &str) -> Option<String> {
        self.companies
            .iter()
            .find(|c| feed::contains_ignore_case(haystack_lower, c))
            .cloned()
    }

    fn match_sector(&self, haystack_lower: &str) -> Option<String> {
        self.sectors
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|k| feed::contains_keyword(haystack_lower, k))
            })
            .map(|rule| rule.name.clone())
    }
}
