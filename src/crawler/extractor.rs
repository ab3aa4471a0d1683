//! Single-URL fetch and extraction
//!
//! [`PageExtractor::fetch`] runs one URL through the full chain: cache
//! lookup, robots check, rate limiting, HTTP fetch with retries, parsing and
//! cache store. It never fails; every failure becomes a
//! [`PageRecord::Error`].

use crate::cache::FetchCache;
use crate::crawler::fetcher::HttpClient;
use crate::crawler::parser::extract_page;
use crate::model::{FetchSource, PageRecord};
use crate::politeness::PolitenessGate;
use crate::url::parse_http_url;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Fetches and parses pages on behalf of the pipeline workers
pub struct PageExtractor {
    client: HttpClient,
    gate: Arc<PolitenessGate>,
    cache: Option<FetchCache>,
}

impl PageExtractor {
    /// Creates an extractor
    ///
    /// # Arguments
    ///
    /// * `client` - Retrying HTTP client for page requests
    /// * `gate` - Shared robots and rate-limit state
    /// * `cache` - Fetch cache, or `None` when caching is disabled globally
    pub fn new(client: HttpClient, gate: Arc<PolitenessGate>, cache: Option<FetchCache>) -> Self {
        Self {
            client,
            gate,
            cache,
        }
    }

    /// Fetches one URL and extracts its content
    ///
    /// # Arguments
    ///
    /// * `url` - The page to fetch
    /// * `use_cache` - Whether to consult and update the fetch cache
    /// * `ttl` - Maximum age of a usable cache entry
    ///
    /// # Returns
    ///
    /// A `Content` record on success, otherwise an `Error` record
    #[tracing::instrument(skip(self, ttl))]
    pub async fn fetch(&self, url: &str, use_cache: bool, ttl: Duration) -> PageRecord {
        let cache = self.cache.as_ref().filter(|_| use_cache);

        if let Some(cache) = cache {
            if let Some(page) = cache.get(url, ttl).await {
                return PageRecord::Content {
                    page,
                    source: FetchSource::Cache,
                };
            }
        }

        if let Err(e) = parse_http_url(url) {
            return PageRecord::error(url, e.to_string());
        }

        if !self.gate.is_allowed(url).await {
            tracing::debug!("Blocked by robots.txt: {}", url);
            return PageRecord::robots_blocked(url);
        }

        self.gate.wait_if_needed(url).await;

        let response = match self.client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", url, e);
                return PageRecord::error(url, e.to_string());
            }
        };

        let base = match Url::parse(&response.final_url).or_else(|_| Url::parse(url)) {
            Ok(base) => base,
            Err(e) => return PageRecord::error(url, format!("Invalid URL: {}", e)),
        };

        let page = match extract_page(&response.body, url, &base, response.content_type.as_deref()) {
            Ok(page) => page,
            Err(message) => {
                tracing::debug!("Parse failed for {}: {}", url, message);
                return PageRecord::error(url, message);
            }
        };

        if let Some(cache) = cache {
            cache.put(url, &page).await;
        }

        tracing::debug!(
            "Extracted {} ({} links, {} headings)",
            url,
            page.links.len(),
            page.headings.len()
        );

        PageRecord::Content {
            page,
            source: FetchSource::Network,
        }
    }
}
