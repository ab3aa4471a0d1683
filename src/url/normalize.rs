use crate::UrlError;
use url::Url;

/// Parses a URL string and requires an http(s) scheme and a host
///
/// # Examples
///
/// ```
/// use plethora::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/page").is_ok());
/// assert!(parse_http_url("ftp://example.com/file").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Returns a fragment-insensitive key for comparing page URLs
///
/// Two links that differ only by `#fragment` point at the same document.
/// Strings that do not parse are returned trimmed and unchanged.
pub fn comparison_key(url_str: &str) -> String {
    match Url::parse(url_str.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => url_str.trim().to_string(),
    }
}

/// Builds the robots.txt URL for the site serving `url`
pub fn robots_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Some(format!("{}://{}{}/robots.txt", url.scheme(), host, port))
}
