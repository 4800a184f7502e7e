//! Error types for every stage of a collection run.
//!
//! Only [`CollectError`] ever leaves the binary; everything else is recovered
//! inside the pipeline, logged, and counted in the run summary.

use chrono::NaiveDate;
use thiserror::Error;

/// Configuration and startup failures. These abort the run before any
/// collection begins.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("failed to read config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("no storage backend configured (set --output-dir or --bucket)")]
    MissingStore,
}

/// A topic query against the news source failed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("news source returned status {0}")]
    Status(u16),

    #[error("unparseable feed: {0}")]
    Feed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

/// Downloading or parsing an article page failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("network error: {0}")]
    Network(String),

    #[error("article page returned status {0}")]
    Status(u16),

    #[error("article page has no extractable text")]
    EmptyBody,

    #[error("no article extractor configured")]
    Unavailable,
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Network(err.to_string())
    }
}

/// Persisting a record failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error writing {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid object store endpoint: {0}")]
    Endpoint(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("object store returned status {status} for {key}")]
    Status { key: String, status: u16 },
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}

/// Why a candidate article was dropped instead of stored.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("published {actual}, expected {expected}")]
    DateMismatch {
        expected: NaiveDate,
        actual: NaiveDate,
    },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}
