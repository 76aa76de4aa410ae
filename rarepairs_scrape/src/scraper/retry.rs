use http::{header::RETRY_AFTER, HeaderMap};
use std::time::Duration;

/// What to do when the archive answers 429 Too Many Requests.
///
/// Retry `n` (counting from 1) waits `backoff_factor * 2^(n-1)`, capped at `max_backoff`, unless
/// the server sent a `Retry-After` and we were told to respect it. Once `max_retries` retries
/// have also been throttled the request fails as rate limited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub respect_retry_after: bool,
}

impl RetryPolicy {
    /// Very conservative. AO3 throttles automated access hard.
    pub const fn new() -> RetryPolicy {
        RetryPolicy {
            max_retries: 7,
            backoff_factor: Duration::from_secs(60),
            max_backoff: Duration::from_secs(120),
            respect_retry_after: true,
        }
    }

    /// Fails on the first 429
    pub const fn none() -> RetryPolicy {
        RetryPolicy {
            max_retries: 0,
            backoff_factor: Duration::ZERO,
            max_backoff: Duration::ZERO,
            respect_retry_after: false,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> RetryPolicy {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: Duration) -> RetryPolicy {
        self.backoff_factor = backoff_factor;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> RetryPolicy {
        self.max_backoff = max_backoff;
        self
    }

    pub fn with_respect_retry_after(mut self, respect_retry_after: bool) -> RetryPolicy {
        self.respect_retry_after = respect_retry_after;
        self
    }

    /// Exponential wait before retry number `retry`. Retry 0 is the original request.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let factor = 1u32.checked_shl(retry - 1).unwrap_or(u32::MAX);
        self.backoff_factor
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Wait before retry number `retry`, given what the throttled response said
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) if self.respect_retry_after => wait,
            _ => self.backoff(retry),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// `Retry-After` in its delay-seconds form. The HTTP-date form is ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}
