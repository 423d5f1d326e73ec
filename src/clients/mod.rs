//! HTTP transport for App Store feed requests.
//!
//! This module provides the session layer that every feed request goes
//! through. It owns the connection pool and implements request pacing and
//! retries.
//!
//! # Overview
//!
//! - [`AppStoreSession`]: The pooled HTTP session
//! - [`HttpError`]: Transport-level errors (404 or exhausted retries)
//! - [`NetworkError`]: Details of a request that failed after all retries
//!
//! # Retry Behavior
//!
//! - **404 (Not Found)**: Returns immediately without retry
//! - **429 (Rate Limited)**: Retries using the `Retry-After` header value if
//!   present, otherwise the exponential backoff
//! - **5xx, other non-2xx statuses, connection errors, timeouts**: Retries
//!   with exponential backoff
//!
//! A session with `retries = n` makes at most `n + 1` attempts per request.

mod errors;
mod session;

pub use errors::{HttpError, NetworkError};
pub use session::{AppStoreSession, DEFAULT_REQUEST_TIMEOUT, SDK_VERSION};
