use url::Url;

/// Extracts the registered domain (network location) from a URL
///
/// The registered domain is the lowercase host plus the port when the URL
/// carries an explicit one. It is the partition key for robots policies and
/// rate limiting, so two URLs on the same host but different explicit ports
/// are treated as different sites.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase `host[:port]`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use plethora::url::registered_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(registered_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(registered_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn registered_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
