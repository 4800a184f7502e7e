//! Google News topic headlines.
//!
//! Each topic has an RSS feed at
//! `https://news.google.com/rss/headlines/section/topic/{TOPIC}`. The feed
//! cannot be restricted to a date, so it typically mixes the last few days
//! of coverage; the pipeline filters by day afterwards.
//!
//! # Item mapping
//!
//! | RSS element | Candidate field |
//! |-------------|-----------------|
//! | `<title>` | `title` |
//! | `<link>` | `url` |
//! | `<pubDate>` | `published_date` (raw) |
//! | `<description>` | `description` (tags stripped) |
//! | `<source url="...">Name</source>` | `publisher` |

use crate::config::CollectorConfig;
use crate::errors::SourceError;
use crate::models::{CandidateArticle, RawPublisher, Topic};
use crate::sources::ArticleSource;
use crate::utils::collapse_whitespace;
use reqwest::Client;
use rss::Channel;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Client for the Google News topic RSS feeds.
#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    base_url: String,
    language: String,
    country: String,
    max_results: usize,
    exclude_websites: Vec<String>,
}

impl GoogleNewsSource {
    /// Build a source from the run configuration.
    pub fn new(config: &CollectorConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.news_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            country: config.country.clone(),
            max_results: config.max_results,
            exclude_websites: config
                .exclude_websites
                .iter()
                .map(|site| normalize_host(site))
                .collect(),
        })
    }

    /// Feed URL for a topic, including the edition parameters.
    pub fn topic_url(&self, topic: Topic) -> String {
        let hl = urlencoding::encode(&self.language);
        let gl = urlencoding::encode(&self.country);
        format!(
            "{}/rss/headlines/section/topic/{}?hl={hl}&gl={gl}&ceid={gl}:{hl}",
            self.base_url, topic
        )
    }

    /// Whether a publisher homepage belongs to an excluded website.
    fn is_excluded(&self, publisher_href: &str) -> bool {
        let Some(host) = Url::parse(publisher_href)
            .ok()
            .and_then(|u| u.host_str().map(normalize_host))
        else {
            return false;
        };
        self.exclude_websites
            .iter()
            .any(|site| host == *site || host.ends_with(&format!(".{site}")))
    }

    /// Turn a parsed channel into candidates, dropping excluded publishers
    /// and items without a link or title.
    fn candidates_from_channel(&self, channel: &Channel) -> Vec<CandidateArticle> {
        let mut candidates = Vec::new();
        for item in channel.items() {
            if candidates.len() >= self.max_results {
                break;
            }

            let (Some(url), Some(title)) = (item.link(), item.title()) else {
                debug!(
                    guid = ?item.guid().map(|g| g.value()),
                    "Feed item missing link or title; skipping"
                );
                continue;
            };

            let publisher = item
                .source()
                .map(|s| RawPublisher {
                    href: s.url().to_string(),
                    title: s.title().unwrap_or_default().to_string(),
                })
                .unwrap_or_default();

            if self.is_excluded(&publisher.href) {
                debug!(%url, publisher = %publisher.href, "Excluded publisher; skipping");
                continue;
            }

            candidates.push(CandidateArticle {
                url: url.to_string(),
                title: title.to_string(),
                description: item.description().map(strip_tags).unwrap_or_default(),
                publisher,
                published_date: item.pub_date().unwrap_or_default().to_string(),
            });
        }
        candidates
    }
}

impl ArticleSource for GoogleNewsSource {
    #[instrument(level = "info", skip_all, fields(%topic))]
    async fn fetch(&self, topic: Topic) -> Result<Vec<CandidateArticle>, SourceError> {
        let url = self.topic_url(topic);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let content = response.bytes().await?;
        let channel =
            Channel::read_from(&content[..]).map_err(|e| SourceError::Feed(e.to_string()))?;

        let candidates = self.candidates_from_channel(&channel);
        info!(
            items = channel.items().len(),
            count = candidates.len(),
            "Fetched Google News candidates"
        );
        Ok(candidates)
    }
}

/// Lowercase a host and drop a leading `www.`.
fn normalize_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Feed descriptions are HTML snippets; keep only their text.
fn strip_tags(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}
