//! Validated newtype wrappers for App Store identifiers.
//!
//! This module provides type-safe wrappers around app IDs and country codes
//! that validate their contents on construction. Invalid values are rejected
//! with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated App Store app ID.
///
/// The ID is the numeric last path segment of an app's App Store URL,
/// without the `id` prefix. It must be a positive integer.
///
/// # Example
///
/// ```rust
/// use app_store_web_scraper::AppId;
///
/// let id = AppId::new(361309726).unwrap();
/// assert_eq!(id.get(), 361309726);
///
/// // IDs copied from URLs can be parsed from strings
/// let id: AppId = "361309726".parse().unwrap();
/// assert_eq!(id.to_string(), "361309726");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(u64);

impl AppId {
    /// Creates a new validated app ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAppId`] if the ID is zero.
    pub fn new(id: u64) -> Result<Self, ConfigError> {
        if id == 0 {
            return Err(ConfigError::InvalidAppId {
                value: id.to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Returns the numeric ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for AppId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let id = trimmed
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidAppId {
                value: trimmed.to_string(),
            })?;
        Self::new(id)
    }
}

impl TryFrom<u64> for AppId {
    type Error = ConfigError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AppId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = u64::deserialize(deserializer)?;
        Self::new(id).map_err(de::Error::custom)
    }
}

/// A validated two-letter ISO country code.
///
/// Both lowercase (`"de"`) and uppercase (`"FI"`) codes are accepted; the
/// code is normalized to lowercase, which is the form the feed URLs use.
///
/// # Example
///
/// ```rust
/// use app_store_web_scraper::CountryCode;
///
/// let country = CountryCode::new("FI").unwrap();
/// assert_eq!(country.as_ref(), "fi");
///
/// assert!(CountryCode::new("usa").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a new validated country code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCountryCode`] unless the code consists of
    /// exactly two ASCII letters.
    pub fn new(code: impl Into<String>) -> Result<Self, ConfigError> {
        let code = code.into();
        let normalized = code.trim().to_ascii_lowercase();

        if normalized.len() != 2 || !normalized.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::InvalidCountryCode { value: code });
        }

        Ok(Self(normalized))
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CountryCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
