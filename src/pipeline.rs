//! The day × topic × candidate collection loop.
//!
//! For every day in the range and every topic, the pipeline asks the source
//! for candidates, then takes each candidate through
//! normalize (date check, extraction, reshaping) and store before looking at
//! the next one. Nothing but the run counters outlives a candidate.
//!
//! Failures never abort a run. A failed topic query skips that topic for the
//! day; a rejected candidate or failed write skips that candidate. Each case
//! is logged and counted in the returned [`RunSummary`].

use crate::dates::DateRange;
use crate::errors::Rejection;
use crate::extract::ArticleExtractor;
use crate::models::{CandidateArticle, Topic};
use crate::normalize::ArticleNormalizer;
use crate::sources::ArticleSource;
use crate::store::ArticleStore;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use futures::future;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub days: usize,
    pub candidates: usize,
    pub stored: usize,
    pub date_mismatches: usize,
    pub extraction_failures: usize,
    pub malformed: usize,
    pub source_failures: usize,
    pub store_failures: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        self.candidates += 1;
        match outcome {
            Outcome::Stored => self.stored += 1,
            Outcome::DateMismatch => self.date_mismatches += 1,
            Outcome::ExtractionFailed => self.extraction_failures += 1,
            Outcome::Malformed => self.malformed += 1,
            Outcome::StoreFailed => self.store_failures += 1,
        }
    }
}

/// What happened to a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Stored,
    DateMismatch,
    ExtractionFailed,
    Malformed,
    StoreFailed,
}

/// Drives collection over a source, an extractor and a store.
#[derive(Debug)]
pub struct CollectionPipeline<S, E, T> {
    source: S,
    normalizer: ArticleNormalizer<E>,
    store: T,
}

impl<S, E, T> CollectionPipeline<S, E, T>
where
    S: ArticleSource,
    E: ArticleExtractor,
    T: ArticleStore,
{
    pub fn new(source: S, extractor: E, store: T) -> Self {
        Self {
            source,
            normalizer: ArticleNormalizer::new(extractor),
            store,
        }
    }

    /// Collect every topic for every day in `range`, in order.
    ///
    /// Always walks the full range. Re-running a range rewrites the same keys.
    pub async fn run(&self, range: &DateRange, topics: &[Topic]) -> RunSummary {
        let mut summary = RunSummary::default();

        for day in range.days() {
            info!(%day, "Date to gather");
            summary.days += 1;
            for &topic in topics {
                self.collect_topic(day, topic, &mut summary).await;
            }
        }

        info!(
            days = summary.days,
            candidates = summary.candidates,
            stored = summary.stored,
            date_mismatches = summary.date_mismatches,
            extraction_failures = summary.extraction_failures,
            malformed = summary.malformed,
            source_failures = summary.source_failures,
            store_failures = summary.store_failures,
            "Collection run finished"
        );
        summary
    }

    #[instrument(level = "info", skip(self, summary))]
    async fn collect_topic(&self, day: NaiveDate, topic: Topic, summary: &mut RunSummary) {
        let candidates = match self.source.fetch(topic).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Topic query failed; skipping topic");
                summary.source_failures += 1;
                return;
            }
        };
        debug!(count = candidates.len(), "Processing candidates");

        stream::iter(candidates)
            .then(|candidate| async move { self.process(&candidate, day, topic).await })
            .for_each(|outcome| {
                summary.record(outcome);
                future::ready(())
            })
            .await;
    }

    async fn process(&self, candidate: &CandidateArticle, day: NaiveDate, topic: Topic) -> Outcome {
        let record = match self.normalizer.normalize(candidate, day, topic).await {
            Ok(record) => record,
            Err(Rejection::DateMismatch { expected, actual }) => {
                warn!(
                    expected = %expected,
                    actual = %actual,
                    url = %candidate.url,
                    "Article date is not in date range"
                );
                return Outcome::DateMismatch;
            }
            Err(Rejection::Extraction(e)) => {
                warn!(url = %candidate.url, error = %e, "Article extraction failed; skipping");
                return Outcome::ExtractionFailed;
            }
            Err(Rejection::Malformed(reason)) => {
                warn!(
                    url = %candidate.url,
                    title = %truncate_for_log(&candidate.title, 120),
                    %reason,
                    "Malformed candidate; skipping"
                );
                return Outcome::Malformed;
            }
        };

        let key = record.storage_key();
        match self.store.put(&key, &record).await {
            Ok(()) => {
                info!(%key, "Stored article");
                Outcome::Stored
            }
            Err(e) => {
                error!(%key, error = %e, "Failed to store article; continuing");
                Outcome::StoreFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ExtractError, SourceError, StoreError};
    use crate::extract::ExtractedArticle;
    use crate::models::{NormalizedArticle, RawPublisher, StorageKey};
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap, HashSet};

    /// Serves fixed candidates per topic; topics in `failing` error out.
    #[derive(Default)]
    struct FakeSource {
        candidates: HashMap<Topic, Vec<CandidateArticle>>,
        failing: HashSet<Topic>,
        calls: RefCell<Vec<Topic>>,
    }

    impl ArticleSource for FakeSource {
        async fn fetch(&self, topic: Topic) -> Result<Vec<CandidateArticle>, SourceError> {
            self.calls.borrow_mut().push(topic);
            if self.failing.contains(&topic) {
                return Err(SourceError::Status(500));
            }
            Ok(self.candidates.get(&topic).cloned().unwrap_or_default())
        }
    }

    /// Returns the configured text for known urls and fails for the rest.
    #[derive(Default)]
    struct FakeExtractor {
        pages: HashMap<String, String>,
    }

    impl ArticleExtractor for FakeExtractor {
        async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
            self.pages
                .get(url)
                .map(|text| ExtractedArticle {
                    title: None,
                    text: text.clone(),
                })
                .ok_or_else(|| ExtractError::Network("connection refused".to_string()))
        }
    }

    /// In-memory store; keys listed in `failing` reject writes.
    #[derive(Default)]
    struct MemoryStore {
        records: RefCell<BTreeMap<String, NormalizedArticle>>,
        writes: RefCell<Vec<String>>,
        failing: HashSet<String>,
    }

    impl ArticleStore for MemoryStore {
        async fn put(
            &self,
            key: &StorageKey,
            record: &NormalizedArticle,
        ) -> Result<(), StoreError> {
            self.writes.borrow_mut().push(key.to_string());
            if self.failing.contains(key.as_str()) {
                return Err(StoreError::Status {
                    key: key.to_string(),
                    status: 500,
                });
            }
            self.records
                .borrow_mut()
                .insert(key.to_string(), record.clone());
            Ok(())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(url: &str, title: &str, published: &str) -> CandidateArticle {
        CandidateArticle {
            url: url.to_string(),
            title: title.to_string(),
            description: String::new(),
            publisher: RawPublisher {
                href: "https://example.com".to_string(),
                title: "Example".to_string(),
            },
            published_date: published.to_string(),
        }
    }

    fn one_day() -> DateRange {
        DateRange::new(day(2023, 6, 1), day(2023, 6, 2)).unwrap()
    }

    fn pages(entries: &[(&str, &str)]) -> FakeExtractor {
        FakeExtractor {
            pages: entries
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_stores_matching_article() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Technology,
                vec![candidate(
                    "https://example.com/ab",
                    "A/B Test",
                    "Thu, 01 Jun 2023 12:00:00 GMT",
                )],
            )]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/ab", "hello")]),
            MemoryStore::default(),
        );

        let summary = pipeline.run(&one_day(), &[Topic::Technology]).await;

        assert_eq!(summary.stored, 1);
        let records = pipeline.store.records.borrow();
        let record = &records["2023-06-01/TECHNOLOGY/A-B Test"];
        assert_eq!(record.text, "hello");
        assert_eq!(record.title, "A-B Test");
        assert_eq!(record.published_date, day(2023, 6, 1));
    }

    #[tokio::test]
    async fn test_date_mismatch_stores_nothing() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Technology,
                vec![candidate(
                    "https://example.com/ab",
                    "A/B Test",
                    "Fri, 02 Jun 2023 12:00:00 GMT",
                )],
            )]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/ab", "hello")]),
            MemoryStore::default(),
        );

        let summary = pipeline.run(&one_day(), &[Topic::Technology]).await;

        assert_eq!(summary.date_mismatches, 1);
        assert_eq!(summary.stored, 0);
        assert!(pipeline.store.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_stores_nothing() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Technology,
                vec![
                    candidate("https://example.com/down", "Down", "Thu, 01 Jun 2023 12:00:00 GMT"),
                    candidate(
                        "https://example.com/blank",
                        "Blank",
                        "Thu, 01 Jun 2023 13:00:00 GMT",
                    ),
                ],
            )]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/blank", "   ")]),
            MemoryStore::default(),
        );

        let summary = pipeline.run(&one_day(), &[Topic::Technology]).await;

        assert_eq!(summary.extraction_failures, 2);
        assert_eq!(summary.stored, 0);
        assert!(pipeline.store.writes.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failed_topic_does_not_block_other_topics() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Health,
                vec![candidate(
                    "https://example.com/flu",
                    "Flu season",
                    "Thu, 01 Jun 2023 07:00:00 GMT",
                )],
            )]),
            failing: HashSet::from([Topic::Science]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/flu", "Flu text")]),
            MemoryStore::default(),
        );

        let summary = pipeline
            .run(&one_day(), &[Topic::Science, Topic::Health])
            .await;

        assert_eq!(summary.source_failures, 1);
        assert_eq!(summary.stored, 1);
        assert!(
            pipeline
                .store
                .records
                .borrow()
                .contains_key("2023-06-01/HEALTH/Flu season")
        );
    }

    #[tokio::test]
    async fn test_store_failure_continues_with_next_candidate() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::World,
                vec![
                    candidate("https://example.com/1", "First", "Thu, 01 Jun 2023 01:00:00 GMT"),
                    candidate("https://example.com/2", "Second", "Thu, 01 Jun 2023 02:00:00 GMT"),
                ],
            )]),
            ..Default::default()
        };
        let store = MemoryStore {
            failing: HashSet::from(["2023-06-01/WORLD/First".to_string()]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/1", "one"), ("https://example.com/2", "two")]),
            store,
        );

        let summary = pipeline.run(&one_day(), &[Topic::World]).await;

        assert_eq!(summary.store_failures, 1);
        assert_eq!(summary.stored, 1);
        assert_eq!(
            *pipeline.store.writes.borrow(),
            vec!["2023-06-01/WORLD/First", "2023-06-01/WORLD/Second"]
        );
    }

    #[tokio::test]
    async fn test_each_day_keeps_only_its_own_articles() {
        // The source ignores dates and returns the same mixed list every day.
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Business,
                vec![
                    candidate("https://example.com/a", "Day one", "Thu, 01 Jun 2023 10:00:00 GMT"),
                    candidate("https://example.com/b", "Day two", "Fri, 02 Jun 2023 10:00:00 GMT"),
                    candidate(
                        "https://example.com/c",
                        "Day three",
                        "Sat, 03 Jun 2023 10:00:00 GMT",
                    ),
                ],
            )]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[
                ("https://example.com/a", "a"),
                ("https://example.com/b", "b"),
                ("https://example.com/c", "c"),
            ]),
            MemoryStore::default(),
        );
        let range = DateRange::new(day(2023, 6, 1), day(2023, 6, 3)).unwrap();

        let summary = pipeline.run(&range, &[Topic::Business]).await;

        assert_eq!(summary.days, 2);
        assert_eq!(summary.candidates, 6);
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.date_mismatches, 4);
        assert_eq!(
            *pipeline.store.writes.borrow(),
            vec!["2023-06-01/BUSINESS/Day one", "2023-06-02/BUSINESS/Day two"]
        );
        for (key, record) in pipeline.store.records.borrow().iter() {
            assert!(key.starts_with(&record.published_date.to_string()));
        }
    }

    #[tokio::test]
    async fn test_queries_topics_in_order_for_each_day() {
        let pipeline = CollectionPipeline::new(
            FakeSource::default(),
            FakeExtractor::default(),
            MemoryStore::default(),
        );
        let range = DateRange::new(day(2023, 6, 1), day(2023, 6, 3)).unwrap();

        pipeline
            .run(&range, &[Topic::World, Topic::Nation, Topic::Health])
            .await;

        assert_eq!(
            *pipeline.source.calls.borrow(),
            vec![
                Topic::World,
                Topic::Nation,
                Topic::Health,
                Topic::World,
                Topic::Nation,
                Topic::Health
            ]
        );
    }

    #[tokio::test]
    async fn test_rerun_produces_identical_records() {
        let source = FakeSource {
            candidates: HashMap::from([(
                Topic::Science,
                vec![candidate(
                    "https://example.com/mars",
                    "Mars / Moon",
                    "Thu, 01 Jun 2023 12:00:00 GMT",
                )],
            )]),
            ..Default::default()
        };
        let pipeline = CollectionPipeline::new(
            source,
            pages(&[("https://example.com/mars", "red")]),
            MemoryStore::default(),
        );

        pipeline.run(&one_day(), &[Topic::Science]).await;
        let first = pipeline.store.records.borrow().clone();
        pipeline.run(&one_day(), &[Topic::Science]).await;
        let second = pipeline.store.records.borrow().clone();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(pipeline.store.writes.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_range_queries_nothing() {
        let pipeline = CollectionPipeline::new(
            FakeSource::default(),
            FakeExtractor::default(),
            MemoryStore::default(),
        );
        let range = DateRange::new(day(2023, 6, 1), day(2023, 6, 1)).unwrap();

        let summary = pipeline.run(&range, &Topic::ALL).await;

        assert_eq!(summary, RunSummary::default());
        assert!(pipeline.source.calls.borrow().is_empty());
    }
}
