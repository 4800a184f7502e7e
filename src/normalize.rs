//! Validation and reshaping of candidate articles into stored records.
//!
//! Google News topic feeds ignore any date window, so the published date of
//! every candidate is re-checked against the day being collected. Only
//! candidates from that day, with extractable text, become records.

use crate::dates::parse_published_date;
use crate::errors::{ExtractError, Rejection};
use crate::extract::ArticleExtractor;
use crate::models::{CandidateArticle, NormalizedArticle, RawPublisher, Topic};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Turns candidates into [`NormalizedArticle`]s using an injected extractor.
#[derive(Debug, Clone)]
pub struct ArticleNormalizer<E> {
    extractor: E,
}

impl<E: ArticleExtractor> ArticleNormalizer<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Validate `candidate` against `expected_day` and build its record.
    ///
    /// The date check runs before extraction, so mismatched candidates never
    /// cost a page download. The only side effect is the extraction call.
    #[instrument(level = "debug", skip_all, fields(url = %candidate.url, %expected_day, %topic))]
    pub async fn normalize(
        &self,
        candidate: &CandidateArticle,
        expected_day: NaiveDate,
        topic: Topic,
    ) -> Result<NormalizedArticle, Rejection> {
        let published = parse_published_date(&candidate.published_date)?;
        if published != expected_day {
            return Err(Rejection::DateMismatch {
                expected: expected_day,
                actual: published,
            });
        }

        let url = candidate.url.trim();
        if url.is_empty() {
            return Err(Rejection::Malformed("missing url".to_string()));
        }
        let title = sanitize_title(&candidate.title);
        if title.is_empty() {
            return Err(Rejection::Malformed("missing title".to_string()));
        }

        let extracted = self.extractor.extract(url).await?;
        if extracted.text.trim().is_empty() {
            return Err(Rejection::Extraction(ExtractError::EmptyBody));
        }
        debug!(
            bytes = extracted.text.len(),
            page_title = ?extracted.title,
            "Candidate normalized"
        );

        Ok(NormalizedArticle {
            url: url.to_string(),
            title,
            description: candidate.description.trim().to_string(),
            publisher: publisher_map(&candidate.publisher),
            published_date: published,
            topic,
            text: extracted.text,
        })
    }
}

/// Longest title, in bytes, kept as a storage path segment. Leaves room under
/// the usual 255-byte file name limit.
pub const MAX_TITLE_BYTES: usize = 200;

/// Make a title safe to use as one storage path segment.
///
/// Trims surrounding whitespace and replaces path separators and control
/// characters with `-`. The result is cut to [`MAX_TITLE_BYTES`] on a
/// character boundary. A title made only of dots (`.` or `..`) would name a
/// directory, so its dots become `-` too. Applying it twice changes nothing.
pub fn sanitize_title(title: &str) -> String {
    let mut replaced: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    if replaced.len() > MAX_TITLE_BYTES {
        let cut = (0..=MAX_TITLE_BYTES)
            .rev()
            .find(|&i| replaced.is_char_boundary(i))
            .unwrap_or(0);
        replaced.truncate(cut);
        replaced.truncate(replaced.trim_end().len());
    }

    if !replaced.is_empty() && replaced.chars().all(|c| c == '.') {
        return replaced.replace('.', "-");
    }
    replaced
}

/// Flatten publisher metadata into a plain string map, omitting blanks.
fn publisher_map(publisher: &RawPublisher) -> BTreeMap<String, String> {
    [("href", &publisher.href), ("title", &publisher.title)]
        .into_iter()
        .map(|(k, v)| (k, v.trim()))
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
