use std::time::Duration;

use crate::constants::{
    DEFAULT_QUERY_RETRY, DEFAULT_RETRY_DELAY_MS, DEFAULT_STALE_TIME_SECS, MAX_RETRY_DELAY_MS,
};

/// Freshness and retry policy for cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long a fetched value is served without re-fetching.
    pub stale_time: Duration,
    /// Extra attempts after a retryable failure. Mutations are never retried.
    pub retry: u32,
    /// Base delay for exponential backoff between attempts.
    pub retry_delay: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(DEFAULT_STALE_TIME_SECS),
            retry: DEFAULT_QUERY_RETRY,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl QueryConfig {
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Backoff before retry number `attempt` (0-based), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .saturating_mul(factor)
            .min(Duration::from_millis(MAX_RETRY_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.retry, 2);
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let config = QueryConfig::default();
        assert_eq!(config.backoff(0), Duration::from_secs(1));
        assert_eq!(config.backoff(1), Duration::from_secs(2));
        assert_eq!(config.backoff(2), Duration::from_secs(4));
        assert_eq!(config.backoff(10), Duration::from_secs(30));
        assert_eq!(config.backoff(40), Duration::from_secs(30));
    }
}
