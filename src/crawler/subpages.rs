//! Sub-page candidate selection
//!
//! Picks which outbound links of a fetched page are worth following: links on
//! the same registered domain that are neither the page itself nor
//! navigation/asset/listing junk.

use crate::model::PageRecord;
use crate::url::{comparison_key, registered_domain};
use std::collections::HashSet;
use url::Url;

/// Path segments that lead to authentication or account pages
const AUTH_SEGMENTS: &[&str] = &[
    "login", "signin", "sign-in", "signup", "sign-up", "register", "logout", "auth", "account",
    "wp-login", "wp-admin",
];

/// Path segments that lead to listing rather than content pages
const LISTING_SEGMENTS: &[&str] = &["search", "tag", "tags", "category", "categories", "archive"];

/// Query parameters that mark a site search
const SEARCH_PARAMS: &[&str] = &["s", "q"];

/// File extensions of non-page resources
const ASSET_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "tif", "tiff", "avif",
    // audio and video
    "mp3", "wav", "ogg", "flac", "m4a", "mp4", "webm", "avi", "mov", "mkv",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "epub",
    // feeds
    "rss", "atom",
    // styles and scripts
    "css", "js", "json", "map", "woff", "woff2", "ttf",
];

/// Selects up to `max_count` sub-page URLs from a parent's links
///
/// Candidates keep the parent's link order. An `Error` parent yields nothing.
///
/// # Arguments
///
/// * `parent` - The fetched parent page
/// * `max_count` - Maximum number of candidates to return
///
/// # Returns
///
/// Absolute URLs on the parent's registered domain
pub fn select_subpages(parent: &PageRecord, max_count: usize) -> Vec<String> {
    let Some(page) = parent.content() else {
        return Vec::new();
    };
    let Some(domain) = Url::parse(&page.url).ok().and_then(|u| registered_domain(&u)) else {
        return Vec::new();
    };

    let mut seen = HashSet::from([comparison_key(&page.url)]);
    let mut selected = Vec::new();

    for link in &page.links {
        if selected.len() >= max_count {
            break;
        }

        let Ok(url) = Url::parse(&link.url) else {
            continue;
        };
        if registered_domain(&url).as_deref() != Some(domain.as_str()) {
            continue;
        }
        if is_junk(&url) {
            continue;
        }
        if !seen.insert(comparison_key(&link.url)) {
            continue;
        }

        selected.push(link.url.clone());
    }

    tracing::debug!("Selected {} sub-pages of {}", selected.len(), page.url);
    selected
}

/// Returns true for links that should never be followed as sub-pages
pub fn is_junk(url: &Url) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return true;
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).map(str::to_lowercase).collect())
        .unwrap_or_default();

    for segment in &segments {
        let stem = segment.split('.').next().unwrap_or(segment.as_str());
        if AUTH_SEGMENTS.contains(&stem) || LISTING_SEGMENTS.contains(&stem) {
            return true;
        }
    }

    if let Some((_, ext)) = segments.last().and_then(|last| last.rsplit_once('.')) {
        if ASSET_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    url.query_pairs()
        .any(|(key, _)| SEARCH_PARAMS.contains(&key.as_ref()))
}
