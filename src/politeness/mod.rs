//! Politeness gate
//!
//! This module enforces per-site politeness before any page request:
//! - robots.txt is fetched once per registered domain and kept in memory
//! - A minimum interval separates consecutive requests to one domain
//! - A robots `Crawl-delay` longer than the configured interval takes precedence
//!
//! Both maps live behind `std::sync::Mutex` locks that are never held across
//! an await point.

use crate::config::PolitenessConfig;
use crate::crawler::Transport;
use crate::robots::{policy_for_status, RobotsPolicy};
use crate::state::DomainRateState;
use crate::url::{parse_http_url, registered_domain, robots_url};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Robots compliance and per-domain rate limiting shared by all workers
pub struct PolitenessGate {
    transport: Arc<dyn Transport>,
    respect_robots: bool,
    robots_agent: String,
    min_interval: Duration,
    policies: Mutex<HashMap<String, RobotsPolicy>>,
    rates: Mutex<HashMap<String, DomainRateState>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PolitenessGate {
    /// Creates a gate that fetches robots.txt through `transport`
    pub fn new(transport: Arc<dyn Transport>, config: &PolitenessConfig) -> Self {
        Self {
            transport,
            respect_robots: config.respect_robots,
            robots_agent: config.robots_agent.clone(),
            min_interval: Duration::from_millis(config.min_domain_interval_ms),
            policies: Mutex::new(HashMap::new()),
            rates: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether robots.txt permits fetching `url`
    ///
    /// The first call for a domain fetches its robots.txt:
    /// - 2xx: the body is parsed and cached
    /// - 401/403: a disallow-all policy is cached
    /// - other 4xx: an allow-all policy is cached
    /// - 5xx or transport failure: the URL is allowed and nothing is cached
    ///
    /// The robots.txt request takes a rate-limit slot like any page request.
    ///
    /// # Returns
    ///
    /// * `true` - The URL may be fetched
    /// * `false` - robots.txt disallows the URL
    #[tracing::instrument(skip(self))]
    pub async fn is_allowed(&self, url: &str) -> bool {
        if !self.respect_robots {
            return true;
        }

        // Unfetchable URLs fail later with a proper error
        let Ok(parsed) = parse_http_url(url) else {
            return true;
        };
        let (Some(domain), Some(robots)) = (registered_domain(&parsed), robots_url(&parsed)) else {
            return true;
        };

        if let Some(allowed) = self.check_cached(&domain, url) {
            return allowed;
        }

        self.wait_if_needed(&robots).await;
        let response = match self.transport.get(&robots).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}; allowing", robots, e);
                return true;
            }
        };

        let Some(rules) = policy_for_status(response.status, &response.body) else {
            tracing::warn!(
                "robots.txt for {} returned HTTP {}; allowing",
                domain,
                response.status
            );
            return true;
        };
        tracing::debug!("Cached robots policy for {} (HTTP {})", domain, response.status);

        let mut policies = lock(&self.policies);
        let policy = policies
            .entry(domain.clone())
            .or_insert_with(|| RobotsPolicy::new(domain, rules));
        policy.is_allowed(url, &self.robots_agent)
    }

    fn check_cached(&self, domain: &str, url: &str) -> Option<bool> {
        lock(&self.policies)
            .get(domain)
            .map(|policy| policy.is_allowed(url, &self.robots_agent))
    }

    /// Minimum spacing for a domain, raised by a longer robots `Crawl-delay`
    pub fn interval_for(&self, domain: &str) -> Duration {
        let crawl_delay = if self.respect_robots {
            lock(&self.policies)
                .get(domain)
                .and_then(|policy| policy.crawl_delay(&self.robots_agent))
        } else {
            None
        };
        crawl_delay.map_or(self.min_interval, |delay| delay.max(self.min_interval))
    }

    /// Waits until a request to the domain of `url` is permitted
    ///
    /// The next slot is reserved under the lock before sleeping, so concurrent
    /// callers for one domain are spaced by the interval while other domains
    /// are unaffected.
    pub async fn wait_if_needed(&self, url: &str) {
        let Some(domain) = parse_http_url(url).ok().and_then(|u| registered_domain(&u)) else {
            return;
        };
        let interval = self.interval_for(&domain);

        let (wait, slot) = {
            let mut rates = lock(&self.rates);
            let state = rates.entry(domain.clone()).or_default();
            let wait = state.reserve(interval, Instant::now());
            (wait, state.request_count)
        };

        if !wait.is_zero() {
            tracing::trace!("Rate limiting {} (request {}): waiting {:?}", domain, slot, wait);
            tokio::time::sleep(wait).await;
        }
    }
}
