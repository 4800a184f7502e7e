//! Run configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration that queries all seven topics from the US English
//! Google News edition.
//!
//! ```yaml
//! topics: [TECHNOLOGY, SCIENCE]
//! exclude_websites: [wsj.com]
//! language: en
//! country: US
//! max_results: 100
//! request_timeout_secs: 20
//! ```

use crate::errors::CollectError;
use crate::models::Topic;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Publishers skipped by default; mostly paywalled or hard to extract.
pub const DEFAULT_EXCLUDED_WEBSITES: [&str; 5] = [
    "thehill.com",
    "investors.com",
    "si.com",
    "newsweek.com",
    "wsj.com",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Topics to collect, in order.
    pub topics: Vec<Topic>,
    /// Publisher hosts whose articles are never collected.
    pub exclude_websites: Vec<String>,
    /// Google News edition language (`hl`).
    pub language: String,
    /// Google News edition country (`gl`).
    pub country: String,
    /// Upper bound on candidates taken from one topic feed.
    pub max_results: usize,
    /// Per-request timeout for every outbound HTTP call.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub news_base_url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            topics: Topic::ALL.to_vec(),
            exclude_websites: DEFAULT_EXCLUDED_WEBSITES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            language: "en".to_string(),
            country: "US".to_string(),
            max_results: 100,
            request_timeout_secs: 20,
            user_agent: concat!("news_collector/", env!("CARGO_PKG_VERSION")).to_string(),
            news_base_url: "https://news.google.com".to_string(),
        }
    }
}

impl CollectorConfig {
    /// Load the configuration from `path`, or fall back to defaults when no
    /// path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, CollectError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config_error = |reason: String| CollectError::Config {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = Self::from_yaml(&raw).map_err(|e| config_error(e.to_string()))?;
        info!(topics = config.topics.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parse a YAML document; an empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}
