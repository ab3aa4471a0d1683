//! Robots.txt parser
//!
//! Rule matching is delegated to the robotstxt crate; this module adds the
//! synthesized allow-all/disallow-all policies and `Crawl-delay` lookup.

use robotstxt::DefaultMatcher;

/// How a domain's robots rules were obtained
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    /// No restrictions (missing robots.txt)
    AllowAll,
    /// Everything disallowed (robots.txt access forbidden)
    DisallowAll,
    /// Rules from a fetched robots.txt body
    Content(String),
}

/// Parsed robots.txt data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a ParsedRobots from raw robots.txt content
    ///
    /// An empty body allows everything.
    pub fn from_content(content: &str) -> Self {
        let rules = if content.trim().is_empty() {
            Rules::AllowAll
        } else {
            Rules::Content(content.to_string())
        };
        Self { rules }
    }

    /// Creates a permissive policy that allows everything
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a policy that disallows every path
    pub fn disallow_all() -> Self {
        Self {
            rules: Rules::DisallowAll,
        }
    }

    /// Checks if a URL is allowed for the given robots agent token
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL (or path) to check
    /// * `agent` - The product token matched against `User-agent` lines
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, agent, url)
            }
        }
    }

    /// Gets the crawl delay for a robots agent token
    ///
    /// A group naming the agent takes precedence over the `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no applicable crawl delay is specified
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        let Rules::Content(content) = &self.rules else {
            return None;
        };

        let agent = agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut for_agent: Option<f64> = None;
        let mut for_wildcard: Option<f64> = None;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // Consecutive User-agent lines share one group
                if !group_open {
                    group.clear();
                    group_open = true;
                }
                group.push(value.to_lowercase());
                continue;
            }
            group_open = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };
            if !delay.is_finite() || delay < 0.0 {
                continue;
            }
            if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                for_agent.get_or_insert(delay);
            } else if group.iter().any(|ua| ua == "*") {
                for_wildcard.get_or_insert(delay);
            }
        }

        for_agent.or(for_wildcard)
    }
}
