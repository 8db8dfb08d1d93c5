use crate::types::{AggregatorError, FetchConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Scope used when the caller does not name one.
pub const DEFAULT_SCOPE: &str = "general";

/// A sector and the keywords that classify text into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl SectorRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Source tables, lookup tables and limits for the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub general_sources: Vec<String>,
    pub scope_sources: BTreeMap<String, Vec<String>>,
    /// Scanned in order, first match wins
    pub companies: Vec<String>,
    /// Scanned in order, first match wins
    pub sectors: Vec<SectorRule>,
    pub cache_ttl_seconds: u64,
    pub max_articles: usize,
    pub description_limit: usize,
    pub default_query_limit: usize,
    /// Upper bound on cached scope keys, unknown scopes included
    pub max_cached_scopes: usize,
    pub fetch: FetchConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        let urls = |list: &[&str]| list.iter().map(|u| u.to_string()).collect::<Vec<_>>();

        let mut scope_sources = BTreeMap::new();
        scope_sources.insert(
            "germany".to_string(),
            urls(&[
                "https://www.boerse.de/rss/nachrichten-marktberichte",
                "https://www.finanzen.net/rss/news",
            ]),
        );
        scope_sources.insert(
            "france".to_string(),
            urls(&[
                "https://www.boursorama.com/rss/actualites/economie-politique",
                "https://feeds.feedburner.com/LesEchosActualitesFinance",
            ]),
        );
        scope_sources.insert(
            "italy".to_string(),
            urls(&[
                "https://feeds.bloomberg.com/markets/news.rss",
                "https://www.milanofinanza.it/rss",
            ]),
        );
        scope_sources.insert(
            "netherlands".to_string(),
            urls(&[
                "https://feeds.feedburner.com/financieelnieuws",
                "https://www.nrc.nl/rss/economie/",
            ]),
        );
        scope_sources.insert(
            "spain".to_string(),
            urls(&[
                "https://e00-expansion.uecdn.es/rss/mercados.xml",
                "https://feeds.elpais.com/mrss-s/pages/ep/site/elpais.com/section/economia/portada",
            ]),
        );

        Self {
            general_sources: urls(&[
                "https://feeds.finance.yahoo.com/rss/2.0/headline",
                "https://www.reuters.com/arc/outboundfeeds/rss/category/business/",
                "https://feeds.bloomberg.com/business/news.rss",
            ]),
            scope_sources,
            companies: urls(&[
                "SAP",
                "Siemens",
                "ASML",
                "LVMH",
                "TotalEnergies",
                "Deutsche Bank",
                "BNP Paribas",
                "Unilever",
                "Shell",
                "Santander",
            ]),
            sectors: vec![
                SectorRule::new("Technology", &["tech", "software", "AI", "digital", "startup"]),
                SectorRule::new("Banking", &["bank", "financial", "finance", "lending", "credit"]),
                SectorRule::new("Energy", &["energy", "oil", "gas", "renewable", "solar", "wind"]),
                SectorRule::new("Automotive", &["car", "auto", "vehicle", "electric vehicle", "EV"]),
                SectorRule::new("Healthcare", &["health", "pharma", "medical", "drug", "treatment"]),
            ],
            cache_ttl_seconds: 300,
            max_articles: 50,
            description_limit: 200,
            default_query_limit: 20,
            max_cached_scopes: 32,
            fetch: FetchConfig::default(),
        }
    }
}

impl NewsConfig {
    /// Load overrides from a JSON file. Fields missing from the file keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: NewsConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(
            "Loaded news config from {} ({} general sources, {} scopes)",
            path.display(),
            config.general_sources.len(),
            config.scope_sources.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_articles == 0 {
            return Err(AggregatorError::Config("max_articles must be positive".to_string()));
        }
        if self.default_query_limit == 0 {
            return Err(AggregatorError::Config("default_query_limit must be positive".to_string()));
        }
        if self.max_cached_scopes == 0 {
            return Err(AggregatorError::Config("max_cached_scopes must be positive".to_string()));
        }
        if self.sectors.iter().any(|s| s.name.trim().is_empty()) {
            return Err(AggregatorError::Config("sector names must not be empty".to_string()));
        }
        Ok(())
    }

    /// General sources first, then the scope's own list when the scope is known.
    pub fn sources_for(&self, scope: Option<&str>) -> Vec<String> {
        let mut urls = self.general_sources.clone();
        if let Some(extra) = scope.and_then(|s| self.scope_sources.get(s)) {
            urls.extend(extra.iter().cloned());
        }
        urls
    }

    pub fn scopes(&self) -> Vec<String> {
        self.scope_sources.keys().cloned().collect()
    }
}

/// Settings for the HTTP boundary, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub news_config: Option<PathBuf>,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let news_config = env::var("NEWS_CONFIG").ok().map(PathBuf::from);

        Self::from_parts(&host, &port, news_config)
    }

    pub fn from_parts(host: &str, port: &str, news_config: Option<PathBuf>) -> Result<Self> {
        let port = port
            .parse::<u16>()
            .map_err(|e| AggregatorError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(host)
            .map_err(|e| AggregatorError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Self {
            server_addr: SocketAddr::new(ip, port),
            news_config,
        })
    }
}
