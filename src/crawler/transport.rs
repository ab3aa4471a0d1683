//! HTTP transport
//!
//! This module defines the single-request GET seam used by every network
//! caller (search, robots, page fetches) and its reqwest implementation:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Transparent gzip/brotli decoding and bounded redirect following
//! - Classification of transport failures

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// URL after redirects
    pub final_url: String,

    /// Decoded response body; empty unless the response was a 2xx with a
    /// textual content type
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP status level
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Performs single HTTP GET requests
///
/// Implementations make exactly one attempt per call; retries are layered on
/// top by [`crate::crawler::HttpClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    match HeaderValue::from_str(&config.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!(
            "Ignoring invalid Accept-Language value: {:?}",
            config.accept_language
        ),
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let wants_body = (200..300).contains(&status)
            && content_type.as_deref().map_or(true, is_textual_content_type);
        let body = if wants_body {
            response.text().await.map_err(classify_error)?
        } else {
            tracing::debug!(
                "Skipping body of {} (HTTP {}, {})",
                final_url,
                status,
                content_type.as_deref().unwrap_or("no content type")
            );
            String::new()
        };

        Ok(HttpResponse {
            status,
            content_type,
            final_url,
            body,
        })
    }
}

/// Returns true for media types whose body is worth decoding as text
///
/// Covers `text/*`, HTML/XHTML and other XML or JSON types. PDFs, images,
/// video and archives are not downloaded.
pub fn is_textual_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime.ends_with("/xml")
        || mime.ends_with("/json")
        || mime.ends_with("+json")
}

/// Maps a reqwest error to a transport failure class
fn classify_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let config = HttpConfig::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_with_invalid_accept_language() {
        let config = HttpConfig {
            accept_language: "en\nUS".to_string(),
            ..HttpConfig::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_is_success() {
        let mut response = HttpResponse {
            status: 200,
            content_type: None,
            final_url: "https://example.com/".to_string(),
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 204;
        assert!(response.is_success());
        response.status = 301;
        assert!(!response.is_success());
        response.status = 503;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        let transport = ReqwestTransport::new(&HttpConfig {
            connect_timeout_secs: 2,
            ..HttpConfig::default()
        })
        .unwrap();

        // Bind then drop a listener so the port is closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = transport
            .get(&format!("http://127.0.0.1:{}/", port))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "got {:?}", err);
    }

    #[test]
    fn test_textual_content_types() {
        assert!(is_textual_content_type("text/html; charset=utf-8"));
        assert!(is_textual_content_type("text/plain"));
        assert!(is_textual_content_type("application/xhtml+xml"));
        assert!(is_textual_content_type("application/json"));
        assert!(!is_textual_content_type("application/pdf"));
        assert!(!is_textual_content_type("video/mp4"));
        assert!(!is_textual_content_type("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_binary_body_is_not_downloaded() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"%PDF-1.4 binary".to_vec())
                    .insert_header("content-type", "application/pdf"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("User-agent: *")
                    .insert_header("content-type", "text/plain"),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();

        let pdf = transport.get(&format!("{}/paper.pdf", server.uri())).await.unwrap();
        assert_eq!(pdf.status, 200);
        assert_eq!(pdf.content_type.as_deref(), Some("application/pdf"));
        assert!(pdf.body.is_empty());

        let robots = transport.get(&format!("{}/robots.txt", server.uri())).await.unwrap();
        assert_eq!(robots.body, "User-agent: *");
    }
}
