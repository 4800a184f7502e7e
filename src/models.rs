//! Data models for candidate and persisted articles.
//!
//! This module defines the records that flow through a collection run:
//! - [`Topic`]: the fixed set of news sections that are queried
//! - [`CandidateArticle`]: unvalidated metadata returned by the news source
//! - [`NormalizedArticle`]: the validated record written to storage
//! - [`StorageKey`]: the `date/topic/title` path a record is stored under

use crate::errors::CollectError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A news section. Used both as the query for the news source and as the
/// middle segment of every storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Topic {
    World,
    Nation,
    Business,
    Technology,
    Entertainment,
    Science,
    Health,
}

impl Topic {
    /// Every topic, in collection order.
    pub const ALL: [Topic; 7] = [
        Topic::World,
        Topic::Nation,
        Topic::Business,
        Topic::Technology,
        Topic::Entertainment,
        Topic::Science,
        Topic::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::World => "WORLD",
            Topic::Nation => "NATION",
            Topic::Business => "BUSINESS",
            Topic::Technology => "TECHNOLOGY",
            Topic::Entertainment => "ENTERTAINMENT",
            Topic::Science => "SCIENCE",
            Topic::Health => "HEALTH",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CollectError::UnknownTopic(wanted.to_string()))
    }
}

impl TryFrom<String> for Topic {
    type Error = CollectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Publisher metadata as it appears in the feed's `<source>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPublisher {
    /// Publisher homepage, e.g. `https://www.reuters.com`.
    pub href: String,
    /// Publisher display name.
    pub title: String,
}

/// An article as listed by the news source, before any validation.
///
/// The published date is kept as the raw feed string; the source's date
/// filtering is not trusted, so the normalizer re-checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArticle {
    pub url: String,
    pub title: String,
    pub description: String,
    pub publisher: RawPublisher,
    /// Raw `pubDate`, e.g. `Thu, 01 Jun 2023 12:00:00 GMT`.
    pub published_date: String,
}

/// The record persisted for each article that survives validation and
/// extraction.
///
/// # JSON shape
///
/// ```text
/// {
///   "url": "...",
///   "title": "A-B Test",
///   "description": "...",
///   "publisher": { "href": "...", "title": "..." },
///   "published date": "2023-06-01",
///   "topic": "TECHNOLOGY",
///   "text": "..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub url: String,
    /// Sanitized title; safe to use as a single path segment.
    pub title: String,
    pub description: String,
    pub publisher: BTreeMap<String, String>,
    #[serde(rename = "published date")]
    pub published_date: NaiveDate,
    pub topic: Topic,
    pub text: String,
}

impl NormalizedArticle {
    /// The key this record is stored under, derived from the record itself.
    pub fn storage_key(&self) -> StorageKey {
        StorageKey::new(self.published_date, self.topic, &self.title)
    }
}

/// A `{published_date}/{topic}/{title}` storage path.
///
/// Two records with the same key overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(published_date: NaiveDate, topic: Topic, sanitized_title: &str) -> Self {
        Self(format!(
            "{}/{}/{}",
            published_date.format("%Y-%m-%d"),
            topic,
            sanitized_title
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path segments of the key, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.splitn(3, '/')
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
