use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Transport that retrieves the raw body of a feed document.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// GET the document at `url` and return its body as text
    async fn get(&self, url: &str) -> Result<String>;
}

/// Time source for cache freshness and missing publish dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
