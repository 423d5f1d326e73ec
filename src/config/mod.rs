//! Configuration types for the App Store review scraper.
//!
//! This module provides the configuration types used to set up an
//! [`AppStoreSession`](crate::AppStoreSession) and to identify apps.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`SessionConfig`]: Request pacing and retry settings of a session
//! - [`SessionConfigBuilder`]: A builder for constructing [`SessionConfig`] instances
//! - [`AppId`]: A validated App Store app ID
//! - [`CountryCode`]: A validated, lowercase two-letter country code
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use app_store_web_scraper::SessionConfig;
//!
//! let config = SessionConfig::builder()
//!     .delay(Duration::from_millis(500))
//!     .delay_jitter(Duration::from_millis(100))
//!     .retries(5)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.retries(), 5);
//! ```

mod newtypes;

pub use newtypes::{AppId, CountryCode};

use std::time::Duration;

use crate::error::ConfigError;

/// Base URL of the iTunes Store, which serves the RSS review feeds.
pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// Default number of retries for a failed request.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default multiplier of the exponential retry backoff, in seconds.
pub const DEFAULT_RETRIES_BACKOFF_FACTOR: f64 = 1.0;

/// Default ceiling for a single retry backoff wait.
pub const DEFAULT_RETRIES_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Request pacing and retry configuration of an
/// [`AppStoreSession`](crate::AppStoreSession).
///
/// # Delays
///
/// Before every request except the first one of a session, the session
/// sleeps for `delay`, plus or minus a random amount of up to
/// `delay_jitter`. This reduces the probability of hitting rate limits.
/// The jitter is ignored when `delay` is zero.
///
/// # Retries
///
/// Failed requests are retried up to `retries` times. The wait before the
/// n-th attempt (n >= 2) is `retries_backoff_factor * 2^(n - 2)` seconds,
/// capped at `retries_backoff_max`. With a factor of 0.1 the waits are
/// 0.1s, 0.2s, 0.4s and so on. If `retries_backoff_jitter` is set, a random
/// amount of up to that value is added to or subtracted from each wait.
///
/// # Thread Safety
///
/// `SessionConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    delay: Duration,
    delay_jitter: Duration,
    retries: u32,
    retries_backoff_factor: f64,
    retries_backoff_max: Duration,
    retries_backoff_jitter: Duration,
    base_url: String,
    user_agent_prefix: Option<String>,
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Returns the base delay between requests.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the maximum random deviation from the base delay.
    #[must_use]
    pub const fn delay_jitter(&self) -> Duration {
        self.delay_jitter
    }

    /// Returns the maximum number of retries per request.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the backoff multiplier in seconds.
    #[must_use]
    pub const fn retries_backoff_factor(&self) -> f64 {
        self.retries_backoff_factor
    }

    /// Returns the ceiling of a single backoff wait.
    #[must_use]
    pub const fn retries_backoff_max(&self) -> Duration {
        self.retries_backoff_max
    }

    /// Returns the maximum random deviation from each backoff wait.
    #[must_use]
    pub const fn retries_backoff_jitter(&self) -> Duration {
        self.retries_backoff_jitter
    }

    /// Returns the base URL the feed paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the backoff wait before the given attempt, without jitter.
    ///
    /// Attempts are numbered from 1; the first attempt is never delayed by
    /// backoff.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use app_store_web_scraper::SessionConfig;
    ///
    /// let config = SessionConfig::builder()
    ///     .retries_backoff_factor(0.5)
    ///     .retries_backoff_max(Duration::from_secs(1))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.retry_backoff(1), Duration::ZERO);
    /// assert_eq!(config.retry_backoff(2), Duration::from_millis(500));
    /// assert_eq!(config.retry_backoff(3), Duration::from_secs(1));
    /// assert_eq!(config.retry_backoff(4), Duration::from_secs(1));
    /// ```
    #[must_use]
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        if attempt < 2 || self.retries_backoff_factor == 0.0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let secs = self.retries_backoff_factor * 2f64.powi(exponent);
        let max_secs = self.retries_backoff_max.as_secs_f64();

        // `as_secs_f64` rounds very large ceilings up past `Duration::MAX`.
        Duration::try_from_secs_f64(secs.min(max_secs)).unwrap_or(self.retries_backoff_max)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            delay_jitter: Duration::ZERO,
            retries: DEFAULT_RETRIES,
            retries_backoff_factor: DEFAULT_RETRIES_BACKOFF_FACTOR,
            retries_backoff_max: DEFAULT_RETRIES_BACKOFF_MAX,
            retries_backoff_jitter: Duration::ZERO,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent_prefix: None,
        }
    }
}

// Verify SessionConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionConfig>();
};

/// Builder for constructing [`SessionConfig`] instances.
///
/// All fields are optional.
///
/// # Defaults
///
/// - `delay`: zero
/// - `delay_jitter`: zero
/// - `retries`: 3
/// - `retries_backoff_factor`: 1.0 (waits of 1s, 2s, 4s, ...)
/// - `retries_backoff_max`: 60 seconds
/// - `retries_backoff_jitter`: zero
/// - `base_url`: `https://itunes.apple.com`
/// - `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use app_store_web_scraper::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .delay(Duration::from_secs(1))
///     .retries(2)
///     .retries_backoff_factor(0.1)
///     .retries_backoff_max(Duration::from_secs(5))
///     .user_agent_prefix("review-dashboard/2.0")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.user_agent_prefix(), Some("review-dashboard/2.0"));
/// ```
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    delay: Option<Duration>,
    delay_jitter: Option<Duration>,
    retries: Option<u32>,
    retries_backoff_factor: Option<f64>,
    retries_backoff_max: Option<Duration>,
    retries_backoff_jitter: Option<Duration>,
    base_url: Option<String>,
    user_agent_prefix: Option<String>,
}

impl SessionConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay between consecutive requests.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the maximum random deviation from the delay.
    #[must_use]
    pub const fn delay_jitter(mut self, jitter: Duration) -> Self {
        self.delay_jitter = Some(jitter);
        self
    }

    /// Sets the maximum number of retries for a failed request.
    ///
    /// Zero disables retries.
    #[must_use]
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets the backoff multiplier in seconds.
    #[must_use]
    pub const fn retries_backoff_factor(mut self, factor: f64) -> Self {
        self.retries_backoff_factor = Some(factor);
        self
    }

    /// Sets the ceiling of a single backoff wait.
    #[must_use]
    pub const fn retries_backoff_max(mut self, max: Duration) -> Self {
        self.retries_backoff_max = Some(max);
        self
    }

    /// Sets the maximum random deviation from each backoff wait.
    #[must_use]
    pub const fn retries_backoff_jitter(mut self, jitter: Duration) -> Self {
        self.retries_backoff_jitter = Some(jitter);
        self
    }

    /// Sets the base URL the feed paths are resolved against.
    ///
    /// This is mostly useful for pointing a session at a mock server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`SessionConfig`], validating all values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the backoff factor is
    /// negative or not finite, [`ConfigError::BackoffMaxTooLow`] if retries
    /// are enabled and the backoff ceiling is below the first backoff wait,
    /// and [`ConfigError::InvalidBaseUrl`] if the base URL is not an
    /// absolute http(s) URL.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let defaults = SessionConfig::default();

        let retries_backoff_factor = self
            .retries_backoff_factor
            .unwrap_or(defaults.retries_backoff_factor);
        if !retries_backoff_factor.is_finite() || retries_backoff_factor < 0.0 {
            return Err(ConfigError::InvalidOption {
                option: "retries_backoff_factor",
                value: retries_backoff_factor,
            });
        }

        let retries = self.retries.unwrap_or(defaults.retries);
        let retries_backoff_max = self
            .retries_backoff_max
            .unwrap_or(defaults.retries_backoff_max);
        if retries > 0 && retries_backoff_max.as_secs_f64() < retries_backoff_factor {
            return Err(ConfigError::BackoffMaxTooLow {
                max_secs: retries_backoff_max.as_secs_f64(),
                initial_secs: retries_backoff_factor,
            });
        }

        let base_url = match self.base_url {
            Some(url) => normalize_base_url(&url)?,
            None => defaults.base_url,
        };

        Ok(SessionConfig {
            delay: self.delay.unwrap_or(defaults.delay),
            delay_jitter: self.delay_jitter.unwrap_or(defaults.delay_jitter),
            retries,
            retries_backoff_factor,
            retries_backoff_max,
            retries_backoff_jitter: self
                .retries_backoff_jitter
                .unwrap_or(defaults.retries_backoff_jitter),
            base_url,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

/// Validates a base URL and strips trailing slashes.
fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let invalid = || ConfigError::InvalidBaseUrl {
        url: url.to_string(),
    };

    let parsed = reqwest::Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}
