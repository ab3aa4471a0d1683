//! URL handling module for Plethora
//!
//! This module provides the helpers shared by the politeness layer, the page
//! parser and the sub-page selector: registered domain extraction, http(s)
//! URL validation and fragment-insensitive comparison keys.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::registered_domain;
pub use normalize::{comparison_key, parse_http_url, robots_url};
