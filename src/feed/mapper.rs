//! Mapping of raw feed entries to [`AppReview`] records.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ParseError;
use crate::review::AppReview;

// JSON pointers into a feed entry. Every value is wrapped in a `label` object.
const ID: &str = "/id/label";
const UPDATED: &str = "/updated/label";
const AUTHOR_NAME: &str = "/author/name/label";
const TITLE: &str = "/title/label";
const CONTENT: &str = "/content/label";
const RATING: &str = "/im:rating/label";
const VERSION: &str = "/im:version/label";

/// Converts one raw feed entry into an [`AppReview`].
///
/// ID, date, rating and content are required. A missing author name,
/// title or app version maps to an empty string. Mapping is pure: the same
/// entry always yields an equal record.
///
/// # Errors
///
/// Returns [`ParseError::MissingField`] if a required field is absent,
/// [`ParseError::InvalidDate`] if the timestamp is not RFC 3339, and
/// [`ParseError::InvalidRating`] if the rating is not an integer from 1 to 5.
///
/// # Example
///
/// ```rust
/// use app_store_web_scraper::map_review_entry;
/// use serde_json::json;
///
/// let entry = json!({
///     "id": {"label": "10512345678"},
///     "updated": {"label": "2024-02-29T08:15:00-07:00"},
///     "author": {"name": {"label": "appfan"}},
///     "title": {"label": "Solid"},
///     "content": {"label": "Does the job.", "attributes": {"type": "text"}},
///     "im:rating": {"label": "4"},
///     "im:version": {"label": "5.0.1"}
/// });
///
/// let review = map_review_entry(&entry).unwrap();
/// assert_eq!(review.rating(), 4);
/// assert_eq!(review.date().to_rfc3339(), "2024-02-29T15:15:00+00:00");
/// ```
pub fn map_review_entry(entry: &Value) -> Result<AppReview, ParseError> {
    let id = required_text(entry, ID, "id")?;
    let date = parse_date(&required_text(entry, UPDATED, "updated")?)?;
    let rating = parse_rating(entry.pointer(RATING).ok_or(ParseError::MissingField {
        field: "im:rating",
    })?)?;
    let content = required_text(entry, CONTENT, "content")?;

    AppReview::new(
        id,
        date,
        optional_text(entry, AUTHOR_NAME),
        optional_text(entry, TITLE),
        content,
        rating,
        optional_text(entry, VERSION),
    )
}

/// Parses a feed timestamp into UTC.
///
/// Accepts RFC 3339 timestamps with a numeric offset or a `Z` suffix.
pub(crate) fn parse_date(value: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|source| ParseError::InvalidDate {
            value: value.to_string(),
            source,
        })
}

fn parse_rating(value: &Value) -> Result<u8, ParseError> {
    let invalid = || ParseError::InvalidRating {
        value: value.to_string(),
    };

    let rating = match value {
        Value::String(s) => s.trim().parse::<u8>().map_err(|_| invalid())?,
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(invalid())
    }
}

/// Returns the text at `pointer`, accepting numbers as well as strings.
fn text_at(entry: &Value, pointer: &str) -> Option<String> {
    match entry.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(entry: &Value, pointer: &str, field: &'static str) -> Result<String, ParseError> {
    text_at(entry, pointer).ok_or(ParseError::MissingField { field })
}

fn optional_text(entry: &Value, pointer: &str) -> String {
    text_at(entry, pointer).unwrap_or_default()
}
