pub mod types;
pub mod traits;
pub mod config;
pub mod clock;
pub mod diagnostics;
pub mod parser;
pub mod fetcher;
pub mod rss_utils;
pub mod enricher;
pub mod cache;
pub mod aggregator;
pub mod query;
pub mod api;

pub use types::*;
pub use traits::{Clock, FeedClient};
pub use config::{NewsConfig, SectorRule, ServerConfig, DEFAULT_SCOPE};
pub use clock::{ManualClock, SystemClock};
pub use diagnostics::{Diagnostics, FailureKind, FetchFailure};
pub use parser::FeedParser;
pub use fetcher::{Fetcher, HttpFeedClient};
pub use enricher::Enricher;
pub use cache::{CacheEntry, ScopeCache};
pub use aggregator::NewsAggregator;
pub use query::{filter_articles, NewsFilters, NewsService};
