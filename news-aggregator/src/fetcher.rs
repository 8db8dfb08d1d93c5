use crate::diagnostics::{Diagnostics, FailureKind, FetchFailure};
use crate::parser::FeedParser;
use crate::traits::{Clock, FeedClient};
use crate::types::{AggregatorError, FetchConfig, RawItem, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// `FeedClient` backed by reqwest.
pub struct HttpFeedClient {
    client: Client,
    config: FetchConfig,
}

impl HttpFeedClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_feed_size_mb {
                return Err(AggregatorError::FeedTooLarge { size_mb });
            }
        }

        let content = response.text().await?;
        let size_mb = content.len() / (1024 * 1024);
        if size_mb > self.config.max_feed_size_mb {
            return Err(AggregatorError::FeedTooLarge { size_mb });
        }

        Ok(content)
    }
}

/// Fetches and parses one feed at a time, never failing the caller.
pub struct Fetcher {
    client: Arc<dyn FeedClient>,
    parser: FeedParser,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<Diagnostics>,
}

impl Fetcher {
    pub fn new(client: Arc<dyn FeedClient>, clock: Arc<dyn Clock>, diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            client,
            parser: FeedParser::new(),
            clock,
            diagnostics,
        }
    }

    /// Fetch `url` and return its items. Any failure yields an empty list and a diagnostic.
    pub async fn fetch(&self, url: &str, scope: &str) -> Vec<RawItem> {
        let start_time = Instant::now();

        match self.try_fetch(url).await {
            Ok(items) => {
                info!(
                    "Fetched {} items from {} in {}ms",
                    items.len(),
                    url,
                    start_time.elapsed().as_millis()
                );
                items
            }
            Err(e) => {
                warn!("Error fetching feed {}: {}", url, e);
                self.diagnostics.record(FetchFailure {
                    kind: FailureKind::Source,
                    url: Some(url.to_string()),
                    scope: scope.to_string(),
                    error: e.to_string(),
                    at: self.clock.now(),
                });
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<RawItem>> {
        debug!("Fetching feed: {}", url);
        let content = self.client.get(url).await?;
        self.parser.parse_feed(&content)
    }
}
