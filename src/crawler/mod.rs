//! Crawler module for fetching and extracting pages
//!
//! This module contains the fetch pipeline, including:
//! - HTTP transport and retry logic
//! - HTML parsing into structured page content
//! - Single-URL extraction behind the cache and politeness gate
//! - Sub-page selection
//! - The bounded worker pool and overall run coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod scheduler;
mod subpages;
mod transport;

pub use coordinator::Coordinator;
pub use extractor::PageExtractor;
pub use fetcher::{is_transient_status, FetchError, HttpClient, RetryPolicy};
pub use parser::{extract_page, is_html_content_type, resolve_link};
pub use scheduler::WorkerPool;
pub use subpages::{is_junk, select_subpages};
pub use transport::{build_http_client, HttpResponse, ReqwestTransport, Transport, TransportError};

use crate::config::{Config, MAX_WORKERS};
use crate::model::{DetailLevel, PipelineResult};
use crate::PlethoraError;
use std::time::Duration;

/// Parameters of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub query: String,
    pub level: DetailLevel,

    /// Number of search results to process (> 0)
    pub desired_count: usize,

    /// Maximum sub-pages fetched per parent page
    pub max_subpages: usize,

    /// Worker pool size (> 0)
    pub workers: usize,

    pub use_cache: bool,

    /// Maximum age of a usable cache entry
    pub cache_ttl: Duration,
}

impl RunRequest {
    /// Creates a request using the default configuration
    pub fn new(query: impl Into<String>) -> Self {
        Self::from_config(query, &Config::default())
    }

    /// Creates a request from the `[pipeline]` and `[cache]` sections
    pub fn from_config(query: impl Into<String>, config: &Config) -> Self {
        Self {
            query: query.into(),
            level: config.pipeline.level,
            desired_count: config.pipeline.results,
            max_subpages: config.pipeline.subpages,
            workers: config.pipeline.workers,
            use_cache: config.cache.enabled,
            cache_ttl: Duration::from_secs(config.cache.ttl_secs),
        }
    }

    /// Checks the numeric bounds of the request
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The request can be run
    /// * `Err(PlethoraError::InvalidRequest)` - A count is out of range
    pub fn validate(&self) -> Result<(), PlethoraError> {
        if self.desired_count == 0 {
            return Err(PlethoraError::InvalidRequest(
                "result count must be greater than 0".to_string(),
            ));
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(PlethoraError::InvalidRequest(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }

        Ok(())
    }
}

/// Runs one complete pipeline
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP transport, cache store and search provider from `config`
/// 2. Search for the query
/// 3. Fetch result pages and, at high detail, their sub-pages
/// 4. Return the ordered result bundle
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `request` - The run parameters
///
/// # Returns
///
/// * `Ok(PipelineResult)` - The run completed (individual pages may have failed)
/// * `Err(PlethoraError)` - The search failed or the setup was invalid
pub async fn run(config: &Config, request: RunRequest) -> Result<PipelineResult, PlethoraError> {
    Coordinator::from_config(config)?.run(request).await
}
