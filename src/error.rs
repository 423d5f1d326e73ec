//! Error types for the App Store review scraper.
//!
//! This module contains the crate-level [`Error`] returned by review
//! fetching, together with the [`ConfigError`] and [`ParseError`] types it
//! wraps. Transport failures live in [`crate::clients`].
//!
//! # Error Handling
//!
//! Configuration errors are raised eagerly, when a session, entry or review
//! stream is constructed. Everything else surfaces lazily, on the pull of the
//! review stream that triggered the failing request:
//!
//! - [`Error::AppNotFound`]: the app does not exist in the requested country
//! - [`Error::Parse`]: the feed payload did not match the expected schema
//! - [`Error::Network`]: the request failed after all retries
//! - [`Error::Configuration`]: invalid input detected before any request
//!
//! # Example
//!
//! ```rust
//! use app_store_web_scraper::{AppId, ConfigError};
//!
//! let result = AppId::new(0);
//! assert!(matches!(result, Err(ConfigError::InvalidAppId { .. })));
//! ```

use thiserror::Error;

use crate::clients::NetworkError;
use crate::config::{AppId, CountryCode};

/// Errors that can occur while configuring a session, entry or review stream.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// App ID is not a positive integer.
    #[error("Invalid app ID '{value}'. Expected a positive integer (e.g., '361309726').")]
    InvalidAppId {
        /// The invalid value that was provided.
        value: String,
    },

    /// Country code is not a two-letter ISO code.
    #[error("Invalid country code '{value}'. Expected a two-letter ISO code (e.g., 'us').")]
    InvalidCountryCode {
        /// The invalid value that was provided.
        value: String,
    },

    /// A numeric session option is negative or not finite.
    #[error("Invalid value {value} for '{option}'. Expected a finite number >= 0.")]
    InvalidOption {
        /// The name of the option.
        option: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The backoff ceiling is lower than the first backoff wait.
    #[error("retries_backoff_max ({max_secs}s) must not be lower than the initial backoff ({initial_secs}s).")]
    BackoffMaxTooLow {
        /// The configured ceiling in seconds.
        max_secs: f64,
        /// The initial backoff in seconds.
        initial_secs: f64,
    },

    /// The feed base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide an absolute http(s) URL.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The review limit is zero.
    #[error("Review limit must be a positive number.")]
    InvalidLimit,

    /// The requested feed page is outside of `1..=max`.
    #[error("Invalid feed page {page}. Pages are numbered 1 to {max}.")]
    InvalidPage {
        /// The requested page.
        page: u32,
        /// The highest page the feed serves.
        max: u32,
    },

    /// The HTTP client could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClient {
        /// Description of the failure.
        reason: String,
    },
}

/// Errors raised when a feed response does not match the expected schema.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response body is not valid JSON.
    #[error("Feed response is not valid JSON: {source}")]
    InvalidJson {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The JSON document does not have the shape of a reviews feed.
    #[error("Unexpected feed structure: {reason}")]
    InvalidFeed {
        /// Description of what was wrong.
        reason: String,
    },

    /// A required field of a review entry is missing.
    #[error("Review entry is missing required field '{field}'.")]
    MissingField {
        /// Path of the missing field.
        field: &'static str,
    },

    /// The review timestamp could not be parsed.
    #[error("Invalid review date '{value}': {source}")]
    InvalidDate {
        /// The raw date string.
        value: String,
        /// The underlying chrono error.
        #[source]
        source: chrono::ParseError,
    },

    /// The review rating is not an integer between 1 and 5.
    #[error("Invalid review rating '{value}'. Expected an integer between 1 and 5.")]
    InvalidRating {
        /// The raw rating value.
        value: String,
    },
}

/// Unified error type for review fetching.
///
/// # Example
///
/// ```rust,ignore
/// use app_store_web_scraper::{AppStoreEntry, Error};
///
/// let entry = AppStoreEntry::new(361309726, "us")?;
/// let mut reviews = entry.reviews(Some(100))?;
///
/// while let Some(result) = reviews.next().await {
///     match result {
///         Ok(review) => println!("{}: {}", review.rating(), review.title()),
///         Err(Error::AppNotFound { app_id, country }) => {
///             eprintln!("app {app_id} is not available in '{country}'");
///         }
///         Err(e) => eprintln!("fetching reviews failed: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// No app with this ID exists in the App Store of the given country.
    #[error("No app with ID {app_id} was found in the App Store in country '{country}'")]
    AppNotFound {
        /// The app ID that was looked up.
        app_id: AppId,
        /// The country whose store was searched.
        country: CountryCode,
    },

    /// The feed response did not match the expected schema.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The request failed after exhausting all retries.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Invalid configuration detected before sending a request.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_country_code_error_message() {
        let error = ConfigError::InvalidCountryCode {
            value: "usa".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("usa"));
        assert!(message.contains("two-letter"));
    }

    #[test]
    fn test_backoff_max_error_message() {
        let error = ConfigError::BackoffMaxTooLow {
            max_secs: 0.5,
            initial_secs: 2.0,
        };
        let message = error.to_string();
        assert!(message.contains("0.5"));
        assert!(message.contains("initial backoff"));
    }

    #[test]
    fn test_app_not_found_names_app_and_country() {
        let error = Error::AppNotFound {
            app_id: AppId::new(123_456_789).unwrap(),
            country: CountryCode::new("de").unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "No app with ID 123456789 was found in the App Store in country 'de'"
        );
    }

    #[test]
    fn test_missing_field_error_message() {
        let error = ParseError::MissingField { field: "im:rating" };
        assert!(error.to_string().contains("im:rating"));
    }

    #[test]
    fn test_config_error_converts_into_error() {
        let error: Error = ConfigError::InvalidLimit.into();
        assert!(matches!(error, Error::Configuration(ConfigError::InvalidLimit)));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::InvalidLimit;
        let _: &dyn std::error::Error = &error;

        let error = Error::Parse(ParseError::MissingField { field: "id" });
        let _: &dyn std::error::Error = &error;
    }
}
