//! Serde shapes of the iTunes Store RSS reviews feed.
//!
//! Only the envelope is typed. Entries are kept as raw JSON values so that
//! one malformed entry can be handled without rejecting the whole page.

use serde::Deserialize;

/// Top-level JSON document returned by the feed endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedDocument {
    pub feed: Feed,
}

/// The `feed` object.
///
/// The feed omits `entry` once there are no more reviews, and it emits a
/// bare object instead of an array when a list has a single element.
/// `link` is always present, even for unknown apps.
#[derive(Debug, Deserialize)]
pub(crate) struct Feed {
    pub link: OneOrMany<Link>,
    #[serde(default)]
    pub entry: OneOrMany<serde_json::Value>,
}

impl Feed {
    /// Returns the `href` of the first link with the given relation.
    pub fn link_href(&self, rel: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.attributes.rel == rel)
            .and_then(|link| link.attributes.href.as_deref())
    }

    /// Returns whether the feed has a link with the given relation.
    pub fn has_link(&self, rel: &str) -> bool {
        self.link.iter().any(|link| link.attributes.rel == rel)
    }
}

/// A navigation link such as `self`, `first`, `last` or `next`.
#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub attributes: LinkAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkAttributes {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// A list that the feed serializes as a bare value when it has one element.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Many(items) => items.iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(items) if items.is_empty())
    }
}
