//! Configuration types for the engine client.

use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};

/// Default OpenSearch URL.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Where and how to reach the cluster.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Cluster node URLs (e.g., "http://localhost:9200"). Requests are spread
    /// round-robin when more than one is given.
    pub urls: Vec<String>,
    /// Basic-auth user name. Auth is only sent when both user and password are set.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Retry policy for transient failures.
    pub retry: RetryConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_urls([url])
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            username: None,
            password: None,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Parameters of the exponential backoff used for transient engine failures.
///
/// Delays start at `initial_backoff_ms`, grow by `backoff_multiplier` and are
/// capped at `max_backoff_ms`. Which failures are retried depends on whether
/// the call is safe to repeat; see `OpenSearchClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 3).
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds (default: 100).
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay in milliseconds (default: 5000).
    pub max_backoff_ms: u64,
    /// Factor applied to the delay after each retry (default: 2).
    pub backoff_multiplier: u64,
    /// Randomize each delay (default: true).
    pub jitter: bool,
    /// HTTP status codes that count as transient.
    pub retry_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 5000,
            backoff_multiplier: 2,
            jitter: true,
            retry_status_codes: vec![429, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Create a retry config with custom max retries.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Disable retries.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Set the initial backoff.
    pub fn with_initial_backoff(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Set the maximum backoff.
    pub fn with_max_backoff(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// The delays between attempts, one per allowed retry.
    ///
    /// `ExponentialBackoff` yields `factor * base^n`, so the base is the
    /// multiplier and the factor scales the first delay to the initial backoff.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> + Send {
        let base = self.backoff_multiplier.max(1);
        let jittered = self.jitter;
        ExponentialBackoff::from_millis(base)
            .factor((self.initial_backoff_ms / base).max(1))
            .max_delay(Duration::from_millis(self.max_backoff_ms))
            .map(move |delay| if jittered { jitter(delay) } else { delay })
            .take(usize::try_from(self.max_retries).unwrap_or(usize::MAX))
    }
}
