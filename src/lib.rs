//! Plethora: search, fetch and extract
//!
//! This crate runs a web search for a query, then politely fetches the result
//! pages and a bounded set of same-domain sub-pages, extracting structured
//! content from each. Fetches respect robots.txt and per-domain rate limits,
//! are cached on disk with a TTL, and run on a bounded worker pool while the
//! output keeps the search provider's ranking order.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod model;
pub mod politeness;
pub mod robots;
pub mod search;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Plethora operations
///
/// Only run-fatal conditions surface here. Per-page failures are carried as
/// data in [`model::PageRecord::Error`].
#[derive(Debug, Error)]
pub enum PlethoraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search failed: {0}")]
    Search(#[from] search::SearchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid run request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Plethora operations
pub type Result<T> = std::result::Result<T, PlethoraError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunRequest};
pub use model::{DetailLevel, PageContent, PageRecord, PipelineResult, SearchResult};
pub use state::RunStage;
pub use url::registered_domain;
