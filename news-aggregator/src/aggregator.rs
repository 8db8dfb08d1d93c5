use crate::cache::{CacheEntry, ScopeCache};
use crate::clock::SystemClock;
use crate::config::{NewsConfig, DEFAULT_SCOPE};
use crate::diagnostics::{Diagnostics, FailureKind, FetchFailure};
use crate::enricher::Enricher;
use crate::fetcher::{Fetcher, HttpFeedClient};
use crate::traits::{Clock, FeedClient};
use crate::types::{AggregatorError, Article, RawItem, Result};
use chrono::Duration;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Fans out to every source of a scope, merges, enriches and caches the result.
pub struct NewsAggregator {
    config: Arc<NewsConfig>,
    fetcher: Arc<Fetcher>,
    enricher: Enricher,
    cache: ScopeCache,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<Diagnostics>,
}

impl NewsAggregator {
    pub fn new(config: NewsConfig, client: Arc<dyn FeedClient>, clock: Arc<dyn Clock>) -> Self {
        let diagnostics = Arc::new(Diagnostics::new());
        let fetcher = Arc::new(Fetcher::new(client, clock.clone(), diagnostics.clone()));
        let enricher = Enricher::new(&config, clock.clone());
        let ttl_seconds = i64::try_from(config.cache_ttl_seconds).unwrap_or(i64::MAX);
        let ttl = Duration::seconds(ttl_seconds.min(i64::MAX / 1000));
        let cache = ScopeCache::new(ttl, config.max_cached_scopes, clock.clone());

        Self {
            config: Arc::new(config),
            fetcher,
            enricher,
            cache,
            clock,
            diagnostics,
        }
    }

    /// Aggregator talking to the real feeds over HTTP, on wall-clock time.
    pub fn with_http(config: NewsConfig) -> Result<Self> {
        let client = Arc::new(HttpFeedClient::new(config.fetch.clone())?);
        Ok(Self::new(config, client, Arc::new(SystemClock)))
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        self.diagnostics.clone()
    }

    /// Articles for `scope`, served from cache while fresh. Never fails: any
    /// aggregation error yields an empty list and a diagnostic.
    pub async fn aggregate(&self, scope: Option<&str>) -> Vec<Article> {
        let key = scope.unwrap_or(DEFAULT_SCOPE);

        match self.cache.get_or_compute(key, || self.compute(scope, key)).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error aggregating news for scope {}: {}", key, e);
                self.diagnostics.record(FetchFailure {
                    kind: FailureKind::Aggregation,
                    url: None,
                    scope: key.to_string(),
                    error: e.to_string(),
                    at: self.clock.now(),
                });
                Vec::new()
            }
        }
    }

    async fn compute(&self, scope: Option<&str>, key: &str) -> Result<Vec<Article>> {
        let start_time = Instant::now();
        let urls = self.config.sources_for(scope);
        let total_sources = urls.len();

        let handles = urls.into_iter().map(|url| {
            let fetcher = self.fetcher.clone();
            let key = key.to_string();
            tokio::spawn(async move { fetcher.fetch(&url, &key).await })
        });

        // join_all keeps source order: general feeds first, then the scope's own
        let mut raw_items: Vec<RawItem> = Vec::new();
        for result in join_all(handles).await {
            let items = result.map_err(|e| AggregatorError::General(format!("Fetch task failed: {}", e)))?;
            raw_items.extend(items);
        }

        let raw_count = raw_items.len();
        let articles = self.enricher.enrich(raw_items, scope);

        info!(
            "Aggregated scope {}: {} sources, {} raw items, {} articles in {}ms",
            key,
            total_sources,
            raw_count,
            articles.len(),
            start_time.elapsed().as_millis()
        );
        Ok(articles)
    }

    pub async fn cached(&self, scope: Option<&str>) -> Option<CacheEntry> {
        self.cache.entry(scope.unwrap_or(DEFAULT_SCOPE)).await
    }
}
