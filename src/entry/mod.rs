//! App Store entries and their review streams.
//!
//! This module provides [`AppStoreEntry`], which identifies one app in one
//! country's App Store, and [`ReviewStream`], the lazy sequence returned by
//! [`AppStoreEntry::reviews`].

mod stream;

pub use stream::ReviewStream;

use std::sync::Arc;

use crate::clients::AppStoreSession;
use crate::config::{AppId, CountryCode};
use crate::error::ConfigError;
use crate::feed::EntryPolicy;

/// The maximum number of reviews the feed serves for one app and country.
///
/// The limit is per country: for apps available in several countries, one
/// [`AppStoreEntry`] per country can retrieve up to this many reviews each.
pub const MAX_REVIEWS_LIMIT: usize = 500;

/// An app in the App Store of a specific country.
///
/// Construction only validates the format of the app ID and country code.
/// Whether the app actually exists is found out on the first request, which
/// fails with [`Error::AppNotFound`](crate::Error::AppNotFound) otherwise.
///
/// # Sessions
///
/// [`AppStoreEntry::new`] creates a session of its own. Use
/// [`AppStoreEntry::with_session`] to share one session, and therefore one
/// connection pool and one request pacing, between several entries.
///
/// # Example
///
/// ```rust,ignore
/// use app_store_web_scraper::AppStoreEntry;
///
/// let entry = AppStoreEntry::new(361309726, "us")?;
///
/// let reviews = entry.reviews(Some(100))?.try_collect_all().await?;
/// for review in &reviews {
///     println!("{} ({}★): {}", review.user_name(), review.rating(), review.title());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AppStoreEntry {
    app_id: AppId,
    country: CountryCode,
    session: Arc<AppStoreSession>,
    entry_policy: EntryPolicy,
}

impl AppStoreEntry {
    /// Creates an entry with its own default session.
    ///
    /// `country` is a two-letter ISO code; uppercase codes are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAppId`] if `app_id` is zero,
    /// [`ConfigError::InvalidCountryCode`] if `country` is malformed, and
    /// [`ConfigError::HttpClient`] if the session cannot be created.
    ///
    /// # Example
    ///
    /// ```rust
    /// use app_store_web_scraper::AppStoreEntry;
    ///
    /// let entry = AppStoreEntry::new(361309726, "DE").unwrap();
    /// assert_eq!(entry.country().as_ref(), "de");
    ///
    /// assert!(AppStoreEntry::new(0, "de").is_err());
    /// assert!(AppStoreEntry::new(361309726, "deu").is_err());
    /// ```
    pub fn new(app_id: u64, country: &str) -> Result<Self, ConfigError> {
        let app_id = AppId::new(app_id)?;
        let country = CountryCode::new(country)?;
        let session = Arc::new(AppStoreSession::with_defaults()?);
        Ok(Self::from_parts(app_id, country, session))
    }

    /// Creates an entry that uses the given, possibly shared, session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAppId`] if `app_id` is zero and
    /// [`ConfigError::InvalidCountryCode`] if `country` is malformed.
    pub fn with_session(
        app_id: u64,
        country: &str,
        session: Arc<AppStoreSession>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            AppId::new(app_id)?,
            CountryCode::new(country)?,
            session,
        ))
    }

    /// Creates an entry from already validated parts.
    #[must_use]
    pub const fn from_parts(
        app_id: AppId,
        country: CountryCode,
        session: Arc<AppStoreSession>,
    ) -> Self {
        Self {
            app_id,
            country,
            session,
            entry_policy: EntryPolicy::Skip,
        }
    }

    /// Sets how malformed feed entries are handled.
    ///
    /// The default, [`EntryPolicy::Skip`], drops malformed entries and keeps
    /// the rest of the page.
    #[must_use]
    pub const fn with_entry_policy(mut self, policy: EntryPolicy) -> Self {
        self.entry_policy = policy;
        self
    }

    /// Returns the app ID.
    #[must_use]
    pub const fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Returns the normalized, lowercase country code.
    #[must_use]
    pub const fn country(&self) -> &CountryCode {
        &self.country
    }

    /// Returns the session used by this entry.
    #[must_use]
    pub const fn session(&self) -> &Arc<AppStoreSession> {
        &self.session
    }

    /// Returns the policy for malformed feed entries.
    #[must_use]
    pub const fn entry_policy(&self) -> EntryPolicy {
        self.entry_policy
    }

    /// Returns a stream that lazily fetches the app's reviews.
    ///
    /// Reviews are returned most recent first, and only those written by
    /// users of this entry's country. The feed serves a subset of all
    /// reviews ever given to the app (at most [`MAX_REVIEWS_LIMIT`]), so
    /// the count will usually not match the one shown on the App Store.
    ///
    /// As pages are fetched while iterating, the stream can fail after some
    /// reviews have already been returned.
    ///
    /// # Arguments
    ///
    /// * `limit` - The maximum number of reviews to return, or `None` for all
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLimit`] if `limit` is `Some(0)`.
    pub fn reviews(&self, limit: Option<usize>) -> Result<ReviewStream, ConfigError> {
        if limit == Some(0) {
            return Err(ConfigError::InvalidLimit);
        }

        Ok(ReviewStream::new(
            Arc::clone(&self.session),
            self.app_id,
            self.country.clone(),
            self.entry_policy,
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{MAX_PAGES, PAGE_SIZE};

    #[test]
    fn test_max_reviews_limit_matches_feed_caps() {
        assert_eq!(MAX_REVIEWS_LIMIT, MAX_PAGES as usize * PAGE_SIZE);
    }

    #[test]
    fn test_new_validates_app_id_and_country() {
        assert!(matches!(
            AppStoreEntry::new(0, "us"),
            Err(ConfigError::InvalidAppId { .. })
        ));
        assert!(matches!(
            AppStoreEntry::new(1, "u"),
            Err(ConfigError::InvalidCountryCode { .. })
        ));
    }

    #[test]
    fn test_new_normalizes_country() {
        let entry = AppStoreEntry::new(361_309_726, "FI").unwrap();

        assert_eq!(entry.app_id().get(), 361_309_726);
        assert_eq!(entry.country().as_ref(), "fi");
        assert_eq!(entry.entry_policy(), EntryPolicy::Skip);
    }

    #[test]
    fn test_entries_can_share_a_session() {
        let session = Arc::new(AppStoreSession::with_defaults().unwrap());
        let first = AppStoreEntry::with_session(1, "us", Arc::clone(&session)).unwrap();
        let second = AppStoreEntry::with_session(2, "gb", Arc::clone(&session)).unwrap();

        assert!(Arc::ptr_eq(first.session(), second.session()));
        assert_eq!(Arc::strong_count(&session), 3);
    }

    #[test]
    fn test_reviews_rejects_zero_limit() {
        let entry = AppStoreEntry::new(1, "us").unwrap();

        assert!(matches!(entry.reviews(Some(0)), Err(ConfigError::InvalidLimit)));
    }

    #[test]
    fn test_reviews_is_lazy() {
        let entry = AppStoreEntry::new(1, "us").unwrap();
        let stream = entry.reviews(Some(10)).unwrap();

        assert_eq!(stream.yielded(), 0);
        assert_eq!(stream.pages_fetched(), 0);
        assert!(!stream.is_exhausted());
        assert_eq!(entry.session().request_count(), 0);
    }

    #[test]
    fn test_with_entry_policy() {
        let entry = AppStoreEntry::new(1, "us")
            .unwrap()
            .with_entry_policy(EntryPolicy::Strict);

        assert_eq!(entry.entry_policy(), EntryPolicy::Strict);
    }
}
