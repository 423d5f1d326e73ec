//! Pooled HTTP session for App Store feed requests.
//!
//! This module provides the [`AppStoreSession`] type, which owns the HTTP
//! connection pool and implements request pacing and retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;

use crate::clients::errors::{HttpError, NetworkError};
use crate::config::SessionConfig;
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timeout of a single HTTP request attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A pool of HTTP connections to the App Store.
///
/// The session handles:
/// - Connection reuse across requests
/// - Pacing: an optional, jittered delay before every request but the first
/// - Automatic retries with capped exponential backoff for connection
///   errors, timeouts, 429, 5xx and other unexpected statuses
/// - Immediate failure on 404, without consuming the retry budget
///
/// When scraping multiple apps, share one session between the
/// [`AppStoreEntry`](crate::AppStoreEntry) instances (via `Arc`) so they use
/// the same pool and the same pacing. The pool is closed when the last
/// reference to the session is dropped.
///
/// # Thread Safety
///
/// `AppStoreSession` is `Send + Sync`. Its only mutable state, the
/// first-request flag and the request counter, are atomics.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use app_store_web_scraper::{AppStoreEntry, AppStoreSession, SessionConfig};
///
/// let config = SessionConfig::builder()
///     .delay(Duration::from_millis(500))
///     .delay_jitter(Duration::from_millis(100))
///     .build()
///     .unwrap();
/// let session = Arc::new(AppStoreSession::new(config).unwrap());
///
/// let pages = AppStoreEntry::with_session(361309726, "us", Arc::clone(&session)).unwrap();
/// let numbers = AppStoreEntry::with_session(361304891, "us", Arc::clone(&session)).unwrap();
/// ```
#[derive(Debug)]
pub struct AppStoreSession {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Pacing and retry configuration.
    config: SessionConfig,
    /// Headers sent with every request.
    default_headers: HashMap<String, String>,
    /// Whether this session has issued a request yet.
    made_first_request: AtomicBool,
    /// Number of HTTP attempts issued, retries included.
    request_count: AtomicU64,
}

// Verify AppStoreSession is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppStoreSession>();
};

/// Outcome of a failed attempt, kept until the retry decision is made.
struct AttemptFailure {
    status: Option<u16>,
    reason: String,
    source: Option<reqwest::Error>,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    fn transport(error: reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else if error.is_body() || error.is_decode() {
            "failed to read response body"
        } else {
            "transport error"
        };

        Self {
            status: error.status().map(|s| s.as_u16()),
            reason: reason.to_string(),
            source: Some(error),
            retry_after: None,
        }
    }

    fn status(status: StatusCode, retry_after: Option<Duration>) -> Self {
        Self {
            status: Some(status.as_u16()),
            reason: format!("HTTP status {status}"),
            source: None,
            retry_after,
        }
    }
}

impl AppStoreSession {
    /// Creates a new session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying HTTP client
    /// cannot be created (e.g., TLS initialization failure).
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}app-store-web-scraper/{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            default_headers,
            made_first_request: AtomicBool::new(false),
            request_count: AtomicU64::new(0),
        })
    }

    /// Creates a session with the default configuration: no delay and up to
    /// three retries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying HTTP client
    /// cannot be created.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(SessionConfig::default())
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the number of HTTP requests issued so far, retries included.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Returns whether this session has issued a request yet.
    #[must_use]
    pub fn has_made_request(&self) -> bool {
        self.made_first_request.load(Ordering::Acquire)
    }

    /// Resolves a path against the configured base URL.
    pub(crate) fn url_for(&self, path: &str) -> String {
        debug_assert!(path.starts_with('/'), "path must be absolute");
        format!("{}{path}", self.config.base_url())
    }

    /// Sends a GET request and returns the response body.
    ///
    /// This method handles:
    /// - The pacing delay (skipped for the first request of the session)
    /// - Retries with backoff for retryable failures
    /// - Immediate failure on 404
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::NotFound`] on a 404 response and
    /// [`HttpError::Network`] once the retry budget is exhausted.
    pub async fn get(&self, url: &str) -> Result<String, HttpError> {
        self.pace().await;

        let max_attempts = self.config.retries().saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.request_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(url, attempt, "Sending App Store request");

            let mut request = self.client.get(url);
            for (key, value) in &self.default_headers {
                request = request.header(key, value);
            }

            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => AttemptFailure::transport(e),
                        }
                    } else if status == StatusCode::NOT_FOUND {
                        return Err(HttpError::NotFound {
                            url: url.to_string(),
                        });
                    } else {
                        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                            parse_retry_after(response.headers())
                        } else {
                            None
                        };
                        AttemptFailure::status(status, retry_after)
                    }
                }
                Err(e) => AttemptFailure::transport(e),
            };

            if attempt >= max_attempts {
                return Err(HttpError::Network(NetworkError {
                    url: url.to_string(),
                    attempts: attempt,
                    status: failure.status,
                    reason: failure.reason,
                    source: failure.source,
                }));
            }

            let wait = failure.retry_after.map_or_else(
                || self.backoff_before(attempt + 1),
                |retry_after| retry_after.min(self.config.retries_backoff_max()),
            );
            tracing::warn!(
                url,
                attempt,
                status = failure.status,
                reason = %failure.reason,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "App Store request failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Sleeps for the configured delay unless this is the first request.
    async fn pace(&self) {
        let is_first = !self.made_first_request.swap(true, Ordering::AcqRel);
        if is_first || self.config.delay().is_zero() {
            return;
        }

        let delay = jittered(
            self.config.delay(),
            self.config.delay_jitter(),
            &mut rand::thread_rng(),
        );
        tracing::trace!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Delaying request"
        );
        tokio::time::sleep(delay).await;
    }

    /// Returns the jittered backoff wait before the given attempt.
    fn backoff_before(&self, attempt: u32) -> Duration {
        jittered(
            self.config.retry_backoff(attempt),
            self.config.retries_backoff_jitter(),
            &mut rand::thread_rng(),
        )
    }
}

/// Adds a uniform random offset in `[-jitter, +jitter]` to `base`, floored
/// at zero. A zero `base` stays zero.
fn jittered<R: Rng + ?Sized>(base: Duration, jitter: Duration, rng: &mut R) -> Duration {
    if base.is_zero() || jitter.is_zero() {
        return base;
    }

    let jitter_secs = jitter.as_secs_f64();
    let offset = rng.gen_range(-jitter_secs..=jitter_secs);
    let magnitude = Duration::try_from_secs_f64(offset.abs()).unwrap_or(jitter);
    if offset >= 0.0 {
        base.saturating_add(magnitude)
    } else {
        base.saturating_sub(magnitude)
    }
}

/// Parses a `Retry-After` header given in (possibly fractional) seconds.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let secs = headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;

    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}
