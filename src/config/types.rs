use crate::model::DetailLevel;
use serde::Deserialize;

/// Main configuration structure for Plethora
///
/// Every section is optional in the TOML file; missing sections and keys
/// take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub http: HttpConfig,
    pub politeness: PolitenessConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
}

/// Search backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// HTML search endpoint, queried with `q` and `s` (offset) parameters
    pub endpoint: String,

    /// Maximum number of result pages requested per search
    pub max_pages: u32,

    /// Result offset step between consecutive pages
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_pages: 3,
            page_size: 10,
        }
    }
}

/// HTTP transport and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds), doubled per retry
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay (milliseconds)
    pub backoff_max_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("Mozilla/5.0 (compatible; Plethora/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
        }
    }
}

/// Robots.txt and rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Whether robots.txt rules are fetched and enforced
    pub respect_robots: bool,

    /// Product token matched against robots.txt `User-agent` groups
    pub robots_agent: String,

    /// Minimum time between requests to the same domain (milliseconds)
    pub min_domain_interval_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            respect_robots: true,
            robots_agent: "plethora".to_string(),
            min_domain_interval_ms: 1_000,
        }
    }
}

/// Which byte store backs the fetch cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// One file per entry under a directory
    #[default]
    Directory,
    /// A single SQLite database file
    Sqlite,
}

/// Fetch cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub enabled: bool,

    /// Maximum age of a usable cache entry (seconds)
    pub ttl_secs: u64,

    pub backend: CacheBackend,

    /// Directory (directory backend) or database file (sqlite backend)
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3_600,
            backend: CacheBackend::Directory,
            path: ".plethora-cache".to_string(),
        }
    }
}

/// Run defaults, overridable from the command line
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub level: DetailLevel,

    /// Number of search results to process
    pub results: usize,

    /// Maximum sub-pages fetched per result page
    pub subpages: usize,

    /// Concurrent fetch workers
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            level: DetailLevel::Medium,
            results: 5,
            subpages: 2,
            workers: 4,
        }
    }
}
