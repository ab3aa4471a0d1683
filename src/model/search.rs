use serde::{Deserialize, Serialize};

/// One ranked hit returned by the search provider
///
/// The order of results within a search call is the provider's relevance
/// order and is preserved by every later stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
