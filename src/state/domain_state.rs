use std::time::{Duration, Instant};

/// Tracks request timing for one domain
///
/// The rate limiter keeps one of these per registered domain. The stored
/// instant is the start of the most recently reserved request slot, which can
/// lie in the future while a caller is sleeping towards it.
#[derive(Debug, Clone, Default)]
pub struct DomainRateState {
    /// Start of the last reserved request slot for this domain
    pub last_request_time: Option<Instant>,

    /// Number of request slots handed out for this domain
    pub request_count: u32,
}

impl DomainRateState {
    /// Creates a new DomainRateState with no recorded requests
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_interval: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + min_interval;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// The slot is recorded before the caller sleeps, so a second caller
    /// arriving during the sleep is queued behind it instead of passing the
    /// same check.
    pub fn reserve(&mut self, min_interval: Duration, now: Instant) -> Duration {
        let wait = self
            .time_until_next_request(min_interval, now)
            .unwrap_or(Duration::ZERO);
        self.last_request_time = Some(now + wait);
        self.request_count += 1;
        wait
    }
}
