//! Retrying HTTP client
//!
//! This module layers the retry policy over a [`Transport`]:
//! - HTTP 429, 500, 502, 503 and 504 are retried
//! - Request timeouts are retried
//! - Connection failures and other statuses fail immediately
//!
//! Retry `n` (0-based) waits `base * 2^n`, capped at the configured maximum.

use crate::config::HttpConfig;
use crate::crawler::transport::{HttpResponse, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A fetch that did not produce a 2xx response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transient failures persisted through every retry
    #[error("gave up after {attempts} attempts: {reason}")]
    Transient { attempts: u32, reason: String },

    /// Non-retriable HTTP status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Non-retriable transport failure
    #[error("{0}")]
    Network(TransportError),
}

/// Returns true for statuses worth retrying
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Bounded exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// HTTP client with automatic retry of transient failures
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(HttpResponse)` - A 2xx response
    /// * `Err(FetchError)` - The request failed permanently or ran out of retries
    pub async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;

            let reason = match self.transport.get(url).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if is_transient_status(response.status) => {
                    format!("HTTP status {}", response.status)
                }
                Ok(response) => {
                    return Err(FetchError::Status {
                        status: response.status,
                    })
                }
                Err(TransportError::Timeout(msg)) => format!("request timed out: {}", msg),
                Err(e) => return Err(FetchError::Network(e)),
            };

            let retry = attempts - 1;
            if retry >= self.retry.max_retries {
                tracing::debug!("Giving up on {} after {} attempts: {}", url, attempts, reason);
                return Err(FetchError::Transient { attempts, reason });
            }

            let delay = self.retry.delay_for(retry);
            tracing::debug!(
                "Transient failure for {} ({}), retrying in {:?}",
                url,
                reason,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
