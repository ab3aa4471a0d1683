//! Pipeline coordinator - run orchestration logic
//!
//! This module drives one run through its stages:
//! - Searching: one call to the search provider (the only fatal step)
//! - FetchingPages: one worker task per search result
//! - FetchingSubpages: one worker task per fetched page, fetching its
//!   sub-pages sequentially
//! - Assembled: the ordered result bundle
//!
//! Workers finish in any order; pages are put back into search result order
//! before the next stage.

use crate::cache::FetchCache;
use crate::config::Config;
use crate::crawler::extractor::PageExtractor;
use crate::crawler::fetcher::{HttpClient, RetryPolicy};
use crate::crawler::scheduler::WorkerPool;
use crate::crawler::subpages::select_subpages;
use crate::crawler::transport::{ReqwestTransport, Transport};
use crate::crawler::RunRequest;
use crate::model::{PageRecord, PipelineResult, SearchResult, SubPageRecord};
use crate::politeness::PolitenessGate;
use crate::search::{HtmlSearchProvider, SearchProvider};
use crate::state::RunStage;
use crate::storage::open_store;
use crate::PlethoraError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Main pipeline coordinator structure
pub struct Coordinator {
    search: Arc<dyn SearchProvider>,
    extractor: Arc<PageExtractor>,
}

impl Coordinator {
    /// Creates a coordinator from its collaborators
    pub fn new(search: Arc<dyn SearchProvider>, extractor: Arc<PageExtractor>) -> Self {
        Self { search, extractor }
    }

    /// Creates a coordinator backed by a reqwest transport
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(PlethoraError)` - The HTTP client could not be created
    ///
    /// A cache store that cannot be opened is logged and the coordinator runs
    /// without a cache.
    pub fn from_config(config: &Config) -> Result<Self, PlethoraError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.http)?);
        Self::with_transport(config, transport)
    }

    /// Creates a coordinator that performs all requests through `transport`
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PlethoraError> {
        let client = HttpClient::new(Arc::clone(&transport), RetryPolicy::from_config(&config.http));
        let gate = Arc::new(PolitenessGate::new(transport, &config.politeness));

        let cache = if config.cache.enabled {
            match open_store(&config.cache) {
                Ok(store) => Some(FetchCache::new(store)),
                Err(e) => {
                    tracing::warn!(
                        "Could not open cache at {}, continuing without it: {}",
                        config.cache.path,
                        e
                    );
                    None
                }
            }
        } else {
            tracing::debug!("Fetch cache disabled");
            None
        };

        let search = Arc::new(HtmlSearchProvider::new(client.clone(), &config.search)?);
        let extractor = Arc::new(PageExtractor::new(client, gate, cache));

        Ok(Self::new(search, extractor))
    }

    /// Runs the pipeline for one request
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineResult)` - The run completed; per-page failures are records
    /// * `Err(PlethoraError)` - The request was invalid or the search failed
    #[tracing::instrument(skip_all, fields(query = %request.query, level = %request.level))]
    pub async fn run(&self, request: RunRequest) -> Result<PipelineResult, PlethoraError> {
        request.validate()?;

        let mut stage = RunStage::Searching;
        tracing::info!("Stage: {}", stage);
        let search_results = self
            .search
            .search(&request.query, request.desired_count)
            .await?;

        let mut pages = Vec::new();
        let mut subpages = BTreeMap::new();

        while !stage.is_terminal() {
            let next = stage.next(request.level);
            debug_assert!(stage.can_transition_to(next), "{} -> {}", stage, next);
            stage = next;
            tracing::info!("Stage: {}", stage);

            match stage {
                RunStage::FetchingPages => {
                    pages = self.fetch_pages(&search_results, &request).await;
                }
                RunStage::FetchingSubpages => {
                    subpages = self.fetch_subpages(&pages, &request).await;
                }
                RunStage::Searching | RunStage::Assembled => {}
            }
        }

        let result = PipelineResult {
            query: request.query,
            level: request.level,
            search_results,
            pages,
            subpages,
        };
        tracing::info!("Run complete: {}", result.stats());
        Ok(result)
    }

    /// Fetches one page per search result on the worker pool
    async fn fetch_pages(&self, results: &[SearchResult], request: &RunRequest) -> Vec<PageRecord> {
        let mut pool = WorkerPool::new(request.workers);

        for result in results {
            let extractor = Arc::clone(&self.extractor);
            let url = result.url.clone();
            let (use_cache, ttl) = (request.use_cache, request.cache_ttl);
            pool.spawn(url.clone(), async move {
                extractor.fetch(&url, use_cache, ttl).await
            });
        }

        let mut pages: Vec<PageRecord> = pool
            .join_all()
            .await
            .into_iter()
            .map(|(url, outcome)| match outcome {
                Ok(record) => record,
                Err(message) => {
                    tracing::warn!("Page task for {} failed: {}", url, message);
                    PageRecord::error(url, message)
                }
            })
            .collect();

        order_by_results(&mut pages, results);
        pages
    }

    /// Fetches the sub-pages of every content page
    ///
    /// Each parent gets one task; its sub-pages are fetched one after another
    /// so a single site is never hit in parallel from one parent. Only content
    /// records are kept; failed and robots-blocked sub-pages are logged and
    /// left out, so a parent whose candidates all fail maps to an empty list.
    async fn fetch_subpages(
        &self,
        pages: &[PageRecord],
        request: &RunRequest,
    ) -> BTreeMap<String, Vec<SubPageRecord>> {
        let mut pool = WorkerPool::new(request.workers);

        for parent in pages.iter().filter(|p| p.is_content()) {
            let extractor = Arc::clone(&self.extractor);
            let parent = parent.clone();
            let (max, use_cache, ttl) = (request.max_subpages, request.use_cache, request.cache_ttl);
            pool.spawn(parent.url().to_string(), async move {
                let mut records = Vec::new();
                for url in select_subpages(&parent, max) {
                    match extractor.fetch(&url, use_cache, ttl).await {
                        record @ PageRecord::Content { .. } => records.push(record),
                        PageRecord::Error { error_message, .. } => {
                            tracing::debug!("Dropping sub-page {}: {}", url, error_message);
                        }
                    }
                }
                records
            });
        }

        pool.join_all()
            .await
            .into_iter()
            .map(|(parent, outcome)| {
                let records = outcome.unwrap_or_else(|message| {
                    tracing::warn!("Sub-page task for {} failed: {}", parent, message);
                    Vec::new()
                });
                (parent, records)
            })
            .collect()
    }
}

/// Sorts page records into search result order
///
/// Records whose URL is not among the results keep their relative order at
/// the end.
pub(crate) fn order_by_results(pages: &mut [PageRecord], results: &[SearchResult]) {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(results.len());
    for (i, result) in results.iter().enumerate() {
        position.entry(result.url.as_str()).or_insert(i);
    }
    pages.sort_by_key(|page| position.get(page.url()).copied().unwrap_or(usize::MAX));
}
