//! App review records.
//!
//! This module provides [`AppReview`], the immutable record produced for
//! every review in the feed.

use std::sync::Once;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Guards the one-time deprecation warning of [`AppReview::review`].
static REVIEW_ALIAS_WARNING: Once = Once::new();

/// A user review fetched from the App Store.
///
/// Records are immutable: all fields are private and exposed through
/// accessors. The rating is guaranteed to lie between 1 and 5.
///
/// # Serialization
///
/// `AppReview` serializes with the canonical field names. When
/// deserializing, the legacy field name `review` is accepted as an alias of
/// `content`:
///
/// ```rust
/// use app_store_web_scraper::AppReview;
///
/// let review: AppReview = serde_json::from_str(r#"{
///     "id": "9876543210",
///     "date": "2024-03-01T12:30:00Z",
///     "user_name": "jane",
///     "title": "Great",
///     "review": "Works offline too.",
///     "rating": 5,
///     "app_version": "2.1.0"
/// }"#).unwrap();
///
/// assert_eq!(review.content(), "Works offline too.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReviewRecord")]
pub struct AppReview {
    id: String,
    date: DateTime<Utc>,
    user_name: String,
    title: String,
    content: String,
    rating: u8,
    app_version: String,
}

/// Serde shape of [`AppReview`], validated on conversion.
#[derive(Deserialize)]
struct ReviewRecord {
    id: String,
    date: DateTime<Utc>,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    title: String,
    #[serde(alias = "review")]
    content: String,
    rating: u8,
    #[serde(default)]
    app_version: String,
}

impl TryFrom<ReviewRecord> for AppReview {
    type Error = ParseError;

    fn try_from(record: ReviewRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.date,
            record.user_name,
            record.title,
            record.content,
            record.rating,
            record.app_version,
        )
    }
}

impl AppReview {
    /// Creates a validated review record.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidRating`] if `rating` is not between 1
    /// and 5.
    pub fn new(
        id: impl Into<String>,
        date: DateTime<Utc>,
        user_name: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        rating: u8,
        app_version: impl Into<String>,
    ) -> Result<Self, ParseError> {
        if !(1..=5).contains(&rating) {
            return Err(ParseError::InvalidRating {
                value: rating.to_string(),
            });
        }

        Ok(Self {
            id: id.into(),
            date,
            user_name: user_name.into(),
            title: title.into(),
            content: content.into(),
            rating,
            app_version: app_version.into(),
        })
    }

    /// Returns the review ID, unique within the app's feed.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns when the review was submitted or last updated.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Returns the reviewer's display name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns the review title. May be empty.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the review text. May be empty.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the star rating, between 1 and 5.
    #[must_use]
    pub const fn rating(&self) -> u8 {
        self.rating
    }

    /// Returns the app version the review was written for.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// An alias for [`content`](Self::content), kept for backwards
    /// compatibility.
    ///
    /// The first call in a process logs a deprecation warning.
    #[deprecated(since = "0.1.0", note = "use `AppReview::content` instead")]
    #[must_use]
    pub fn review(&self) -> &str {
        REVIEW_ALIAS_WARNING.call_once(|| {
            tracing::warn!(
                "AppReview::review() is deprecated and will be removed, use AppReview::content() instead"
            );
        });
        self.content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_review() -> AppReview {
        AppReview::new(
            "11045983731",
            Utc.with_ymd_and_hms(2024, 5, 4, 18, 2, 11).unwrap(),
            "happy_user",
            "Love it",
            "Does exactly what it says.",
            5,
            "3.2.1",
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_ratings() {
        let date = Utc::now();
        for rating in [0, 6, 255] {
            let result = AppReview::new("1", date, "u", "t", "c", rating, "1.0");
            assert!(matches!(result, Err(ParseError::InvalidRating { .. })));
        }
    }

    #[test]
    fn test_accessors() {
        let review = sample_review();

        assert_eq!(review.id(), "11045983731");
        assert_eq!(review.user_name(), "happy_user");
        assert_eq!(review.title(), "Love it");
        assert_eq!(review.content(), "Does exactly what it says.");
        assert_eq!(review.rating(), 5);
        assert_eq!(review.app_version(), "3.2.1");
        assert_eq!(
            review.date(),
            Utc.with_ymd_and_hms(2024, 5, 4, 18, 2, 11).unwrap()
        );
    }

    #[test]
    #[allow(deprecated)]
    fn test_review_alias_returns_content_and_warns_once() {
        let review = sample_review();

        assert_eq!(review.review(), review.content());
        assert!(REVIEW_ALIAS_WARNING.is_completed());

        // Later calls keep returning the same value.
        assert_eq!(review.review(), "Does exactly what it says.");
    }

    #[test]
    fn test_serialize_uses_canonical_names() {
        let json = serde_json::to_value(sample_review()).unwrap();

        assert_eq!(json["content"], "Does exactly what it says.");
        assert!(json.get("review").is_none());
        assert_eq!(json["rating"], 5);
        assert_eq!(json["date"], "2024-05-04T18:02:11Z");
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let review = sample_review();
        let json = serde_json::to_string(&review).unwrap();
        let parsed: AppReview = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, review);
    }

    #[test]
    fn test_deserialize_rejects_invalid_rating() {
        let result: Result<AppReview, _> = serde_json::from_str(
            r#"{"id":"1","date":"2024-01-01T00:00:00Z","content":"x","rating":9}"#,
        );
        assert!(result.is_err());
    }
}
