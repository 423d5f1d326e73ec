//! Transport-level error types.
//!
//! This module contains the errors raised by
//! [`AppStoreSession`](crate::AppStoreSession) when talking to the feed
//! endpoint:
//!
//! - [`HttpError::NotFound`]: the server answered 404; never retried
//! - [`NetworkError`]: a transport failure or a retryable status that
//!   outlived the retry budget
//!
//! The review fetcher turns these into the crate-level
//! [`Error`](crate::Error).

use thiserror::Error;

/// Error returned when a request could not be completed successfully.
///
/// This error is raised once all retry attempts for a request have been
/// used up, either because the connection kept failing or because the
/// server kept answering with a retryable status code (429, 5xx, or any
/// other unexpected non-2xx status).
///
/// # Example
///
/// ```rust
/// use app_store_web_scraper::NetworkError;
///
/// let error = NetworkError {
///     url: "https://itunes.apple.com/us/rss/customerreviews/page=1/id=1/sortby=mostrecent/json".to_string(),
///     attempts: 4,
///     status: Some(503),
///     reason: "HTTP status 503 Service Unavailable".to_string(),
///     source: None,
/// };
///
/// assert!(error.to_string().contains("after 4 attempt(s)"));
/// ```
#[derive(Debug, Error)]
#[error("Request to {url} failed after {attempts} attempt(s): {reason}")]
pub struct NetworkError {
    /// The requested URL.
    pub url: String,
    /// The number of attempts that were made.
    pub attempts: u32,
    /// The HTTP status of the last response, if the server answered.
    pub status: Option<u16>,
    /// Description of the last failure.
    pub reason: String,
    /// The transport error of the last attempt, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

/// Unified error type for feed requests.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with 404 Not Found.
    #[error("Resource not found: {url}")]
    NotFound {
        /// The requested URL.
        url: String,
    },

    /// The request failed after exhausting all retries.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
