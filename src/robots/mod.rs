//! Robots.txt handling module
//!
//! This module parses robots.txt bodies and holds the per-domain policy
//! records. Fetching and caching of policies is done by
//! [`crate::politeness::PolitenessGate`].

mod parser;
mod policy;

pub use parser::ParsedRobots;
pub use policy::RobotsPolicy;

/// Maps a robots.txt response status to a policy
///
/// # Returns
///
/// * `Some(ParsedRobots)` - A conclusive policy that can be cached
/// * `None` - The status is inconclusive (server error); the caller should
///   allow the request and retry the fetch later
pub fn policy_for_status(status: u16, body: &str) -> Option<ParsedRobots> {
    match status {
        200..=299 => Some(ParsedRobots::from_content(body)),
        401 | 403 => Some(ParsedRobots::disallow_all()),
        400..=499 => Some(ParsedRobots::allow_all()),
        _ => None,
    }
}
