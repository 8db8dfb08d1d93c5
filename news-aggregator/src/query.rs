use crate::aggregator::NewsAggregator;
use crate::config::NewsConfig;
use crate::types::{Article, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Caller-supplied constraints on the aggregated article set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsFilters {
    pub country: Option<String>,
    pub sector: Option<String>,
    pub company: Option<String>,
    pub limit: Option<usize>,
}

impl NewsFilters {
    pub fn for_country(country: &str) -> Self {
        Self {
            country: Some(country.to_string()),
            ..Default::default()
        }
    }

    pub fn sector(mut self, sector: &str) -> Self {
        self.sector = Some(sector.to_string());
        self
    }

    pub fn company(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Sector must match exactly (ignoring case); company matches as a substring
/// of the article's company, title or description. A missing or zero limit
/// falls back to `default_limit`.
pub fn filter_articles(articles: &[Article], filters: &NewsFilters, default_limit: usize) -> Vec<Article> {
    let sector = filters.sector.as_deref().map(str::to_lowercase);
    let company = filters.company.as_deref().map(str::to_lowercase);
    let limit = filters.limit.filter(|&l| l > 0).unwrap_or(default_limit);

    articles
        .iter()
        .filter(|article| match &sector {
            Some(sector) => article
                .sector
                .as_deref()
                .is_some_and(|s| s.to_lowercase() == *sector),
            None => true,
        })
        .filter(|article| match &company {
            Some(term) => {
                article
                    .company
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(term.as_str()))
                    || article.title.to_lowercase().contains(term.as_str())
                    || article.description.to_lowercase().contains(term.as_str())
            }
            None => true,
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Composition root: owns the aggregator (and through it the cache) and
/// answers filtered queries.
#[derive(Clone)]
pub struct NewsService {
    aggregator: Arc<NewsAggregator>,
}

impl NewsService {
    pub fn new(aggregator: NewsAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }

    pub fn with_http(config: NewsConfig) -> Result<Self> {
        Ok(Self::new(NewsAggregator::with_http(config)?))
    }

    pub fn aggregator(&self) -> &NewsAggregator {
        &self.aggregator
    }

    pub async fn query(&self, filters: &NewsFilters) -> Vec<Article> {
        let articles = self.aggregator.aggregate(filters.country.as_deref()).await;
        let filtered = filter_articles(&articles, filters, self.aggregator.config().default_query_limit);

        debug!(
            "Query {:?} matched {} of {} articles",
            filters,
            filtered.len(),
            articles.len()
        );
        filtered
    }

    pub fn scopes(&self) -> Vec<String> {
        self.aggregator.config().scopes()
    }
}
