//! Web search
//!
//! This module defines the search provider seam and the HTML results-page
//! implementation used by the pipeline.

mod html;

pub use html::{parse_results, HtmlSearchProvider};

use crate::model::SearchResult;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that end a run at the search stage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Search backend unavailable: all {pages} result pages failed (last error: {last_error})")]
    Unavailable { pages: u32, last_error: String },
}

/// A source of ranked web search results
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns at most `desired_count` results in relevance order, each URL
    /// appearing once
    async fn search(
        &self,
        query: &str,
        desired_count: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
