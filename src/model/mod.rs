//! Data model shared by every stage of the pipeline
//!
//! - [`SearchResult`]: one ranked hit from the search provider
//! - [`PageRecord`]: the outcome of fetching one URL (content or error)
//! - [`PipelineResult`]: the ordered bundle produced by one run
//! - [`RunStats`]: counts derived from a finished run

mod page;
mod pipeline;
mod search;

pub use page::{
    FetchSource, Heading, Image, Link, ListBlock, ListKind, PageContent, PageRecord,
    SubPageRecord,
};
pub use pipeline::{DetailLevel, PipelineResult, RecordCounts, RunStats};
pub use search::SearchResult;
