//! Fetching and parsing pages of the iTunes Store RSS reviews feed.
//!
//! The feed is served at
//! `/{country}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json`.
//! It returns up to [`PAGE_SIZE`] reviews per page and at most
//! [`MAX_PAGES`] pages, so no more than 500 reviews can be retrieved per app
//! and country.
//!
//! # Overview
//!
//! - [`fetch_review_page`]: Fetches and parses one page through a session
//! - [`parse_review_page`]: Parses a page body that was fetched elsewhere
//! - [`map_review_entry`]: Maps one raw feed entry to an [`AppReview`]
//! - [`ReviewPage`]: The parsed page with its pagination state
//! - [`EntryPolicy`]: What to do with malformed entries

mod mapper;
mod raw;

pub use mapper::map_review_entry;

use crate::clients::{AppStoreSession, HttpError};
use crate::config::{AppId, CountryCode};
use crate::error::{ConfigError, Error, ParseError};
use crate::review::AppReview;

/// The highest page number served by the reviews feed.
pub const MAX_PAGES: u32 = 10;

/// The maximum number of reviews on a single feed page.
pub const PAGE_SIZE: usize = 50;

/// How malformed entries within an otherwise valid page are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryPolicy {
    /// Skip malformed entries and keep the rest of the page.
    #[default]
    Skip,
    /// Fail the whole page with the entry's [`ParseError`].
    Strict,
}

/// One page of the reviews feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewPage {
    number: u32,
    reviews: Vec<AppReview>,
    has_next: bool,
    skipped: usize,
}

impl ReviewPage {
    /// Returns the page number, starting at 1.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Returns the reviews on this page, in feed order.
    #[must_use]
    pub fn reviews(&self) -> &[AppReview] {
        &self.reviews
    }

    /// Returns `true` if the feed announced a further page.
    ///
    /// This does not take the [`MAX_PAGES`] cap into account.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Returns the number of malformed entries that were skipped.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Consumes the page and returns its reviews.
    #[must_use]
    pub fn into_reviews(self) -> Vec<AppReview> {
        self.reviews
    }
}

/// Returns the feed path of a reviews page.
#[must_use]
pub fn review_feed_path(app_id: AppId, country: &CountryCode, page: u32) -> String {
    format!("/{country}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json")
}

/// Fetches one page of an app's reviews.
///
/// # Errors
///
/// Returns:
/// - [`Error::Configuration`] if `page` is not between 1 and [`MAX_PAGES`];
///   no request is made in that case
/// - [`Error::AppNotFound`] on a 404 response, or when the feed's links
///   include no `self` link, which is how the feed answers for unknown apps
/// - [`Error::Parse`] if the body does not match the feed schema (a feed
///   without `link` included), or if an entry is malformed and `policy` is [`EntryPolicy::Strict`]
/// - [`Error::Network`] if the request failed after all retries
///
/// # Example
///
/// ```rust,ignore
/// use app_store_web_scraper::{fetch_review_page, AppId, AppStoreSession, CountryCode, EntryPolicy};
///
/// let session = AppStoreSession::with_defaults()?;
/// let app_id = AppId::new(361309726)?;
/// let country = CountryCode::new("us")?;
///
/// let page = fetch_review_page(&session, app_id, &country, 1, EntryPolicy::Skip).await?;
/// println!("{} reviews, more: {}", page.reviews().len(), page.has_next());
/// ```
pub async fn fetch_review_page(
    session: &AppStoreSession,
    app_id: AppId,
    country: &CountryCode,
    page: u32,
    policy: EntryPolicy,
) -> Result<ReviewPage, Error> {
    if !(1..=MAX_PAGES).contains(&page) {
        return Err(ConfigError::InvalidPage {
            page,
            max: MAX_PAGES,
        }
        .into());
    }

    let url = session.url_for(&review_feed_path(app_id, country, page));
    let body = session.get(&url).await.map_err(|e| match e {
        HttpError::NotFound { .. } => Error::AppNotFound {
            app_id,
            country: country.clone(),
        },
        HttpError::Network(e) => Error::Network(e),
    })?;

    parse_review_page(&body, page, app_id, country, policy)
}

/// Parses the body of a reviews page.
///
/// `app_id` and `country` are only used to build [`Error::AppNotFound`].
///
/// # Errors
///
/// See [`fetch_review_page`]; this function never returns
/// [`Error::Network`].
pub fn parse_review_page(
    body: &str,
    page: u32,
    app_id: AppId,
    country: &CountryCode,
    policy: EntryPolicy,
) -> Result<ReviewPage, Error> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(ParseError::from)?;
    let document: raw::FeedDocument =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidFeed {
            reason: e.to_string(),
        })?;
    let feed = document.feed;

    if !feed.has_link("self") {
        return Err(Error::AppNotFound {
            app_id,
            country: country.clone(),
        });
    }

    let mut reviews = Vec::new();
    let mut skipped = 0;
    for (index, entry) in feed.entry.iter().enumerate() {
        match map_review_entry(entry) {
            Ok(review) => reviews.push(review),
            Err(e) if policy == EntryPolicy::Skip => {
                tracing::debug!(page, index, error = %e, "Skipping malformed review entry");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let has_next = !feed.entry.is_empty()
        && feed
            .link_href("next")
            .is_some_and(|next| Some(next) != feed.link_href("self"));

    Ok(ReviewPage {
        number: page,
        reviews,
        has_next,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app_id() -> AppId {
        AppId::new(123_456_789).unwrap()
    }

    fn country() -> CountryCode {
        CountryCode::new("de").unwrap()
    }

    fn entry(id: &str) -> serde_json::Value {
        json!({
            "id": {"label": id},
            "updated": {"label": "2024-04-01T10:00:00-07:00"},
            "author": {"name": {"label": "user"}},
            "title": {"label": "title"},
            "content": {"label": "content"},
            "im:rating": {"label": "3"},
            "im:version": {"label": "1.0"}
        })
    }

    fn page_url(page: u32) -> String {
        format!(
            "https://itunes.apple.com{}",
            review_feed_path(app_id(), &country(), page)
        )
    }

    fn links(page: u32, next: bool) -> serde_json::Value {
        let mut links = vec![json!({"attributes": {"rel": "self", "href": page_url(page)}})];
        if next {
            links.push(json!({"attributes": {"rel": "next", "href": page_url(page + 1)}}));
        }
        serde_json::Value::Array(links)
    }

    fn parse(body: &serde_json::Value, policy: EntryPolicy) -> Result<ReviewPage, Error> {
        parse_review_page(&body.to_string(), 1, app_id(), &country(), policy)
    }

    #[test]
    fn test_review_feed_path() {
        assert_eq!(
            review_feed_path(app_id(), &country(), 3),
            "/de/rss/customerreviews/page=3/id=123456789/sortby=mostrecent/json"
        );
    }

    #[test]
    fn test_parses_entries_in_feed_order() {
        let body = json!({"feed": {
            "link": links(1, true),
            "entry": [entry("1"), entry("2"), entry("3")]
        }});

        let page = parse(&body, EntryPolicy::Skip).unwrap();
        let ids: Vec<_> = page.reviews().iter().map(AppReview::id).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(page.number(), 1);
        assert!(page.has_next());
        assert_eq!(page.skipped(), 0);
    }

    #[test]
    fn test_page_without_next_link_is_last() {
        let body = json!({"feed": {"link": links(1, false), "entry": [entry("1")]}});

        assert!(!parse(&body, EntryPolicy::Skip).unwrap().has_next());
    }

    #[test]
    fn test_next_link_pointing_to_self_is_ignored() {
        let body = json!({"feed": {
            "link": [
                {"attributes": {"rel": "self", "href": "https://example.com/page=10"}},
                {"attributes": {"rel": "next", "href": "https://example.com/page=10"}}
            ],
            "entry": [entry("1")]
        }});

        assert!(!parse(&body, EntryPolicy::Skip).unwrap().has_next());
    }

    #[test]
    fn test_feed_without_entries_is_empty_last_page() {
        let body = json!({"feed": {"link": links(1, true)}});

        let page = parse(&body, EntryPolicy::Skip).unwrap();
        assert!(page.reviews().is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_single_entry_object() {
        let body = json!({"feed": {"link": links(1, false), "entry": entry("7")}});

        let page = parse(&body, EntryPolicy::Skip).unwrap();
        assert_eq!(page.into_reviews()[0].id(), "7");
    }

    #[test]
    fn test_feed_without_self_link_is_app_not_found() {
        let body = json!({"feed": {"link": []}});

        let result = parse(&body, EntryPolicy::Skip);
        assert!(matches!(
            result,
            Err(Error::AppNotFound { app_id: id, .. }) if id.get() == 123_456_789
        ));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mut broken = entry("2");
        broken.as_object_mut().unwrap().remove("im:rating");
        let body = json!({"feed": {
            "link": links(1, false),
            "entry": [entry("1"), broken, entry("3")]
        }});

        let page = parse(&body, EntryPolicy::Skip).unwrap();
        assert_eq!(page.reviews().len(), 2);
        assert_eq!(page.skipped(), 1);
    }

    #[test]
    fn test_malformed_entries_fail_in_strict_mode() {
        let mut broken = entry("2");
        broken.as_object_mut().unwrap().remove("content");
        let body = json!({"feed": {"link": links(1, false), "entry": [entry("1"), broken]}});

        assert!(matches!(
            parse(&body, EntryPolicy::Strict),
            Err(Error::Parse(ParseError::MissingField { field: "content" }))
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_review_page("<html>", 1, app_id(), &country(), EntryPolicy::Skip);
        assert!(matches!(result, Err(Error::Parse(ParseError::InvalidJson { .. }))));
    }

    #[test]
    fn test_feed_without_link_key_is_parse_error() {
        let body = json!({"feed": {}});
        assert!(matches!(
            parse(&body, EntryPolicy::Skip),
            Err(Error::Parse(ParseError::InvalidFeed { .. }))
        ));
    }

    #[test]
    fn test_wrong_document_shape_is_parse_error() {
        let body = json!({"data": []});
        assert!(matches!(
            parse(&body, EntryPolicy::Skip),
            Err(Error::Parse(ParseError::InvalidFeed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_out_of_range_pages_without_request() {
        let session = AppStoreSession::with_defaults().unwrap();

        for page in [0, MAX_PAGES + 1] {
            let result =
                fetch_review_page(&session, app_id(), &country(), page, EntryPolicy::Skip).await;
            assert!(matches!(
                result,
                Err(Error::Configuration(ConfigError::InvalidPage { .. }))
            ));
        }
        assert_eq!(session.request_count(), 0);
    }
}
