//! # App Store Web Scraper
//!
//! Retrieve customer reviews of App Store apps from the iTunes Store RSS
//! reviews feed, without an official bulk API.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`AppStoreEntry`]: an app in one country's App Store
//! - [`ReviewStream`]: a lazy, page-by-page sequence of [`AppReview`]s
//! - [`AppStoreSession`]: a pooled HTTP session with request pacing and
//!   retries with exponential backoff
//! - [`SessionConfig`] and [`SessionConfigBuilder`] for tuning the session
//!
//! The feed serves at most 10 pages of 50 reviews, so up to
//! [`MAX_REVIEWS_LIMIT`] reviews can be retrieved per app and country.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use app_store_web_scraper::AppStoreEntry;
//!
//! let entry = AppStoreEntry::new(361309726, "us")?;
//! let mut reviews = entry.reviews(Some(100))?;
//!
//! while let Some(review) = reviews.next().await {
//!     let review = review?;
//!     println!("{} ({}★): {}", review.user_name(), review.rating(), review.title());
//! }
//! ```
//!
//! ## Sharing a Session
//!
//! Entries that share a session reuse its connections and its pacing:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use app_store_web_scraper::{AppStoreEntry, AppStoreSession, SessionConfig};
//!
//! let config = SessionConfig::builder()
//!     .delay(Duration::from_secs(1))
//!     .delay_jitter(Duration::from_millis(300))
//!     .retries(5)
//!     .retries_backoff_factor(0.5)
//!     .build()
//!     .unwrap();
//! let session = Arc::new(AppStoreSession::new(config).unwrap());
//!
//! let pages = AppStoreEntry::with_session(361309726, "us", Arc::clone(&session)).unwrap();
//! let numbers = AppStoreEntry::with_session(361304891, "us", Arc::clone(&session)).unwrap();
//! ```
//!
//! ## Errors
//!
//! Invalid input is rejected with a [`ConfigError`] when an entry, session
//! or stream is created. Network, parse and not-found errors surface as
//! [`Error`] on the pull of the stream that triggered the failing request.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (request attempts, retries, skipped
//! entries) and leaves subscriber setup to the application.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Identifiers and options validate on construction
//! - **Thread-safe**: Sessions are `Send + Sync` and can be shared via `Arc`
//! - **Async-first**: Designed for use with the Tokio runtime
//! - **Immutable records**: Reviews are immutable after creation

pub mod clients;
pub mod config;
pub mod entry;
pub mod error;
pub mod feed;
pub mod review;

// Re-export public types at crate root for convenience
pub use clients::{AppStoreSession, HttpError, NetworkError};
pub use config::{AppId, CountryCode, SessionConfig, SessionConfigBuilder};
pub use entry::{AppStoreEntry, ReviewStream, MAX_REVIEWS_LIMIT};
pub use error::{ConfigError, Error, ParseError};
pub use feed::{
    fetch_review_page, map_review_entry, parse_review_page, EntryPolicy, ReviewPage, MAX_PAGES,
    PAGE_SIZE,
};
pub use review::AppReview;
