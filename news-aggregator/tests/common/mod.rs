#![allow(dead_code)]

// Shared fixtures: a scripted feed client, a manual clock and RSS builders
pub use news_aggregator::{AggregatorError, FeedClient, ManualClock, NewsAggregator, NewsConfig, Result};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, Once, RwLock};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const GENERAL_A: &str = "https://feeds.example.com/general-a.rss";
pub const GENERAL_B: &str = "https://www.example.org/general-b.rss";
pub const GERMANY: &str = "https://www.boerse.example.de/rss";

/// Serves canned documents and counts requests per URL. Unknown URLs answer 404.
pub struct MockFeedClient {
    feeds: RwLock<HashMap<String, String>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl MockFeedClient {
    pub fn new() -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_feed(self, url: &str, body: String) -> Self {
        self.set_feed(url, body);
        self
    }

    pub fn set_feed(&self, url: &str, body: String) {
        self.feeds.write().unwrap().insert(url.to_string(), body);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    async fn get(&self, url: &str) -> Result<String> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let body = self.feeds.read().unwrap().get(url).cloned();
        body.ok_or_else(|| AggregatorError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Two general sources and one German source.
pub fn test_config() -> NewsConfig {
    let mut scope_sources = BTreeMap::new();
    scope_sources.insert("germany".to_string(), vec![GERMANY.to_string()]);

    NewsConfig {
        general_sources: vec![GENERAL_A.to_string(), GENERAL_B.to_string()],
        scope_sources,
        ..NewsConfig::default()
    }
}

pub fn build_aggregator(client: Arc<MockFeedClient>, clock: Arc<ManualClock>) -> NewsAggregator {
    NewsAggregator::new(test_config(), client, clock)
}

pub struct TestItem<'a> {
    pub title: &'a str,
    pub pub_date: Option<&'a str>,
    pub description: Option<&'a str>,
    pub link: Option<&'a str>,
}

impl<'a> TestItem<'a> {
    pub fn new(title: &'a str, pub_date: &'a str) -> Self {
        Self {
            title,
            pub_date: Some(pub_date),
            description: None,
            link: None,
        }
    }

    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn link(mut self, link: &'a str) -> Self {
        self.link = Some(link);
        self
    }
}

pub fn rss(items: &[TestItem]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test feed</title>
    <link>https://feeds.example.com/</link>
    <description>Fixture</description>
"#,
    );

    for item in items {
        body.push_str("    <item>\n");
        body.push_str(&format!("      <title>{}</title>\n", item.title));
        if let Some(link) = item.link {
            body.push_str(&format!("      <link>{}</link>\n", link));
        }
        if let Some(description) = item.description {
            body.push_str(&format!("      <description><![CDATA[{}]]></description>\n", description));
        }
        if let Some(pub_date) = item.pub_date {
            body.push_str(&format!("      <pubDate>{}</pubDate>\n", pub_date));
        }
        body.push_str("    </item>\n");
    }

    body.push_str("  </channel>\n</rss>\n");
    body
}

/// RFC 2822 date on the given day of January 2024, at noon.
pub fn jan(day: u32) -> String {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0)
        .unwrap()
        .to_rfc2822()
}
