//! Lazy, page-by-page sequence of app reviews.

use std::sync::Arc;

use futures_util::Stream;

use crate::clients::AppStoreSession;
use crate::config::{AppId, CountryCode};
use crate::error::Error;
use crate::feed::{fetch_review_page, EntryPolicy, MAX_PAGES};
use crate::review::AppReview;

/// Progress of a [`ReviewStream`].
#[derive(Debug)]
enum State {
    /// Nothing has been fetched yet.
    Start,
    /// Yielding the reviews of page `page`.
    Yielding {
        page: u32,
        has_next: bool,
        reviews: std::vec::IntoIter<AppReview>,
    },
    /// The feed, the page cap or the limit has been reached, or a fetch
    /// failed.
    Exhausted,
}

/// A lazily fetched sequence of an app's reviews.
///
/// The stream makes no request until the first review is pulled, and
/// fetches each following page only once the reviews of the previous page
/// have been consumed. It stops cleanly when the feed has no further page,
/// when the [`MAX_PAGES`] cap is reached, or once `limit` reviews have been
/// yielded.
///
/// A failed fetch is returned once as `Some(Err(_))`. Reviews yielded
/// before the failure stay valid, but the stream is exhausted afterwards;
/// it cannot be restarted.
///
/// Create one with [`AppStoreEntry::reviews`](crate::AppStoreEntry::reviews).
///
/// # Example
///
/// ```rust,ignore
/// use app_store_web_scraper::AppStoreEntry;
///
/// let entry = AppStoreEntry::new(361309726, "us")?;
/// let mut reviews = entry.reviews(Some(120))?;
///
/// while let Some(review) = reviews.next().await {
///     let review = review?;
///     println!("[{}] {}", review.rating(), review.title());
/// }
/// ```
#[derive(Debug)]
pub struct ReviewStream {
    session: Arc<AppStoreSession>,
    app_id: AppId,
    country: CountryCode,
    policy: EntryPolicy,
    limit: Option<usize>,
    yielded: usize,
    pages_fetched: u32,
    state: State,
}

impl ReviewStream {
    pub(crate) const fn new(
        session: Arc<AppStoreSession>,
        app_id: AppId,
        country: CountryCode,
        policy: EntryPolicy,
        limit: Option<usize>,
    ) -> Self {
        Self {
            session,
            app_id,
            country,
            policy,
            limit,
            yielded: 0,
            pages_fetched: 0,
            state: State::Start,
        }
    }

    /// Returns the number of reviews yielded so far.
    #[must_use]
    pub const fn yielded(&self) -> usize {
        self.yielded
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Returns `true` once the stream will not yield anything else.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    /// Pulls the next review, fetching the next page if needed.
    ///
    /// Returns `None` once the stream is exhausted.
    pub async fn next(&mut self) -> Option<Result<AppReview, Error>> {
        loop {
            if self.limit.is_some_and(|limit| self.yielded >= limit) {
                self.finish("limit reached");
                return None;
            }

            let next_page = match &mut self.state {
                State::Exhausted => return None,
                State::Start => 1,
                State::Yielding {
                    page,
                    has_next,
                    reviews,
                } => {
                    if let Some(review) = reviews.next() {
                        self.yielded += 1;
                        return Some(Ok(review));
                    }
                    if !*has_next {
                        self.finish("end of feed");
                        return None;
                    }
                    if *page >= MAX_PAGES {
                        self.finish("page cap reached");
                        return None;
                    }
                    *page + 1
                }
            };

            match fetch_review_page(
                &self.session,
                self.app_id,
                &self.country,
                next_page,
                self.policy,
            )
            .await
            {
                Ok(page) => {
                    self.pages_fetched += 1;
                    self.state = State::Yielding {
                        page: page.number(),
                        has_next: page.has_next(),
                        reviews: page.into_reviews().into_iter(),
                    };
                }
                Err(e) => {
                    self.finish("fetch failed");
                    return Some(Err(e));
                }
            }
        }
    }

    /// Drains the stream into a vector, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields. The reviews pulled before
    /// the error are discarded.
    pub async fn try_collect_all(mut self) -> Result<Vec<AppReview>, Error> {
        let mut reviews = Vec::new();
        while let Some(review) = self.next().await {
            reviews.push(review?);
        }
        Ok(reviews)
    }

    /// Converts the pull-based sequence into a [`Stream`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use futures_util::TryStreamExt;
    ///
    /// let five_star: Vec<_> = entry
    ///     .reviews(None)?
    ///     .into_stream()
    ///     .try_filter(|review| futures_util::future::ready(review.rating() == 5))
    ///     .try_collect()
    ///     .await?;
    /// ```
    pub fn into_stream(self) -> impl Stream<Item = Result<AppReview, Error>> {
        futures_util::stream::unfold(self, |mut reviews| async move {
            let item = reviews.next().await?;
            Some((item, reviews))
        })
    }

    fn finish(&mut self, reason: &'static str) {
        tracing::debug!(
            app_id = %self.app_id,
            country = %self.country,
            yielded = self.yielded,
            pages = self.pages_fetched,
            reason,
            "Review stream finished"
        );
        self.state = State::Exhausted;
    }
}
