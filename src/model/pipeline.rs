use crate::model::{PageRecord, SearchResult, SubPageRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How much of the pipeline a run executes
///
/// - `Low`: search results only
/// - `Medium`: search results plus one fetch per result
/// - `High`: medium plus same-domain sub-pages for every fetched result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetailLevel {
    /// Returns true if top-level result pages are fetched
    pub fn fetches_pages(&self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }

    /// Returns true if sub-pages are fetched
    pub fn fetches_subpages(&self) -> bool {
        matches!(self, Self::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown detail level '{}', expected low, medium or high",
                other
            )),
        }
    }
}

/// The complete, ordered bundle produced by one run
///
/// `pages` follows the order of `search_results`. `subpages` maps each
/// successfully fetched parent URL to its sub-page records in link order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub query: String,
    pub level: DetailLevel,
    pub search_results: Vec<SearchResult>,
    pub pages: Vec<PageRecord>,
    pub subpages: BTreeMap<String, Vec<SubPageRecord>>,
}

impl PipelineResult {
    /// Sub-page records for a parent URL, empty if none were scheduled
    pub fn subpages_for(&self, parent_url: &str) -> &[SubPageRecord] {
        self.subpages
            .get(parent_url)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Computes summary counts for logging and display
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats {
            search_results: self.search_results.len(),
            ..RunStats::default()
        };

        for page in &self.pages {
            tally(&mut stats.pages, page);
        }
        for page in self.subpages.values().flatten() {
            tally(&mut stats.subpages, page);
        }

        stats
    }
}

/// Summary counts over one [`PipelineResult`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub search_results: usize,
    pub pages: RecordCounts,
    pub subpages: RecordCounts,
}

/// Per-outcome counts for a set of page records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub total: usize,
    pub fetched: usize,
    pub from_cache: usize,
    pub failed: usize,
    pub robots_blocked: usize,
}

fn tally(counts: &mut RecordCounts, record: &PageRecord) {
    counts.total += 1;
    match record {
        PageRecord::Content { .. } => {
            counts.fetched += 1;
            if record.from_cache() {
                counts.from_cache += 1;
            }
        }
        PageRecord::Error {
            is_robots_blocked, ..
        } => {
            counts.failed += 1;
            if *is_robots_blocked {
                counts.robots_blocked += 1;
            }
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} results | pages: {} ok ({} cached), {} failed ({} robots) | sub-pages: {} ok, {} failed",
            self.search_results,
            self.pages.fetched,
            self.pages.from_cache,
            self.pages.failed,
            self.pages.robots_blocked,
            self.subpages.fetched,
            self.subpages.failed,
        )
    }
}
