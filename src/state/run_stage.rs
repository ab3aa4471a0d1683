//! Stage definitions for one pipeline run
//!
//! A run always starts in `Searching` and ends in `Assembled`. Which stages
//! are visited in between depends on the run's detail level.

use crate::model::DetailLevel;
use std::fmt;

/// Represents the current stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    /// Querying the search provider
    Searching,

    /// Fetching one page per search result
    FetchingPages,

    /// Fetching same-domain sub-pages of every fetched page
    FetchingSubpages,

    /// Terminal: the pipeline result has been built
    Assembled,
}

impl RunStage {
    /// Returns the stage that follows this one for the given detail level
    ///
    /// `Assembled` is terminal and maps to itself.
    pub fn next(&self, level: DetailLevel) -> Self {
        match self {
            Self::Searching if level.fetches_pages() => Self::FetchingPages,
            Self::Searching => Self::Assembled,
            Self::FetchingPages if level.fetches_subpages() => Self::FetchingSubpages,
            Self::FetchingPages => Self::Assembled,
            Self::FetchingSubpages | Self::Assembled => Self::Assembled,
        }
    }

    /// Returns true if moving from this stage to `to` is legal
    pub fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Searching, Self::FetchingPages)
                | (Self::Searching, Self::Assembled)
                | (Self::FetchingPages, Self::FetchingSubpages)
                | (Self::FetchingPages, Self::Assembled)
                | (Self::FetchingSubpages, Self::Assembled)
        )
    }

    /// Returns true if this is the terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Assembled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::FetchingPages => "fetching_pages",
            Self::FetchingSubpages => "fetching_subpages",
            Self::Assembled => "assembled",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
