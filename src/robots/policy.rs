//! Per-domain robots policy

use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// The robots rules in force for one registered domain
///
/// Created on the first conclusive robots.txt fetch for a domain and kept for
/// the lifetime of the process.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Registered domain the policy applies to
    pub domain: String,

    /// Parsed rules
    pub rules: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RobotsPolicy {
    /// Creates a policy stamped with the current time
    pub fn new(domain: impl Into<String>, rules: ParsedRobots) -> Self {
        Self {
            domain: domain.into(),
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// Checks a URL against the policy for the given robots agent token
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        self.rules.is_allowed(url, agent)
    }

    /// Returns the robots `Crawl-delay` for the agent, if any
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        self.rules
            .crawl_delay(agent)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
