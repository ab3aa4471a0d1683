//! HTML search results provider
//!
//! Queries a DuckDuckGo-HTML-style endpoint page by page. Result links on such
//! pages usually point at a redirector carrying the real target in its `uddg`
//! query parameter.

use crate::config::SearchConfig;
use crate::crawler::HttpClient;
use crate::model::SearchResult;
use crate::search::{SearchError, SearchProvider};
use crate::text::normalize_text;
use crate::url::parse_http_url;
use crate::UrlError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid") // Static pattern, safe to panic
}

static RESULT: LazyLock<Selector> = LazyLock::new(|| selector(".result"));
static TITLE_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".result__title a, .result__a"));
static SNIPPET: LazyLock<Selector> = LazyLock::new(|| selector(".result__snippet"));

/// Search provider scraping an HTML results page
pub struct HtmlSearchProvider {
    client: HttpClient,
    endpoint: Url,
    max_pages: u32,
    page_size: u32,
}

impl HtmlSearchProvider {
    /// Creates a provider for the configured endpoint
    ///
    /// # Arguments
    ///
    /// * `client` - Retrying HTTP client used for result pages
    /// * `config` - Endpoint and pagination settings
    ///
    /// # Returns
    ///
    /// * `Ok(HtmlSearchProvider)` - Ready to search
    /// * `Err(UrlError)` - The endpoint is not an http(s) URL
    pub fn new(client: HttpClient, config: &SearchConfig) -> Result<Self, UrlError> {
        Ok(Self {
            client,
            endpoint: parse_http_url(&config.endpoint)?,
            max_pages: config.max_pages.max(1),
            page_size: config.page_size.max(1),
        })
    }

    /// Builds the request URL for a 0-based results page
    pub fn page_url(&self, query: &str, page: u32) -> String {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if page > 0 {
                pairs.append_pair("s", &(page * self.page_size).to_string());
            }
        }
        url.to_string()
    }
}

#[async_trait]
impl SearchProvider for HtmlSearchProvider {
    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        desired_count: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let mut results: Vec<SearchResult> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut requested = 0u32;
        let mut failed = 0u32;
        let mut last_error = String::new();

        for page in 0..self.max_pages {
            if results.len() >= desired_count {
                break;
            }

            let url = self.page_url(query, page);
            requested += 1;

            let response = match self.client.get(&url).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Search page {} failed: {}", page, e);
                    failed += 1;
                    last_error = e.to_string();
                    continue;
                }
            };

            let base = Url::parse(&response.final_url).unwrap_or_else(|_| self.endpoint.clone());
            let before = results.len();
            for result in parse_results(&response.body, &base) {
                if seen.insert(result.url.clone()) {
                    results.push(result);
                }
            }

            let added = results.len() - before;
            tracing::debug!("Search page {} added {} results", page, added);
            if added == 0 {
                break;
            }
        }

        if requested > 0 && failed == requested {
            return Err(SearchError::Unavailable {
                pages: requested,
                last_error,
            });
        }

        results.truncate(desired_count);
        tracing::info!("Search for {:?} returned {} results", query, results.len());
        Ok(results)
    }
}

/// Parses one results page in document order
///
/// Ads are skipped, as are results without a title anchor or whose link
/// target cannot be recovered.
///
/// # Arguments
///
/// * `html` - The results page body
/// * `base` - The page URL, for resolving protocol-relative redirect links
pub fn parse_results(html: &str, base: &Url) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT)
        .filter(|block| !block.value().classes().any(|c| c == "result--ad"))
        .filter_map(|block| {
            let anchor = block.select(&TITLE_ANCHOR).next()?;
            let url = result_target(anchor.value().attr("href")?, base)?;
            let snippet = block
                .select(&SNIPPET)
                .next()
                .map(element_text)
                .unwrap_or_default();
            Some(SearchResult {
                title: element_text(anchor),
                url,
                snippet,
            })
        })
        .collect()
}

fn element_text(element: ElementRef) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Recovers the real result URL from a result link
fn result_target(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if let Ok(link) = base.join(href) {
        if let Some((_, target)) = link.query_pairs().find(|(key, _)| key == "uddg") {
            return parse_http_url(&target).ok().map(String::from);
        }
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return parse_http_url(href).ok().map(|_| href.to_string());
    }
    None
}
