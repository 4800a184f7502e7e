//! # News Collector
//!
//! Collects news articles published within a date range, grouped by topic,
//! and stores each article's full text and metadata as one JSON record keyed
//! by publish date, topic and title.
//!
//! ## Usage
//!
//! ```sh
//! news_collector --start-date 2023-06-01 --end-date 2023-06-08 -o ./articles
//! ```
//!
//! ## Architecture
//!
//! For every day in the range and every topic:
//! 1. **Listing**: query the Google News topic feed for candidates
//! 2. **Validation**: drop candidates not published on the day being collected
//! 3. **Extraction**: download each page and pull out the article text
//! 4. **Storage**: write the record to `{date}/{topic}/{title}` in the
//!    configured store (local directory or object store bucket)
//!
//! The run is sequential and never aborts on a single failure; failed topics,
//! rejected candidates and failed writes are logged and counted.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod errors;
mod extract;
mod models;
mod normalize;
mod pipeline;
mod sources;
mod store;
mod utils;

use cli::Cli;
use config::CollectorConfig;
use dates::DateRange;
use errors::CollectError;
use extract::{AnyExtractor, HtmlExtractor, NullExtractor};
use pipeline::CollectionPipeline;
use sources::GoogleNewsSource;
use store::{AnyStore, LocalStore, ObjectStore};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env first so RUST_LOG and the CLI env fallbacks can come from it.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_collector starting up");
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to load .env; continuing"),
    }

    let args = Cli::parse();
    debug!(start_date = %args.start_date, end_date = ?args.end_date, "Parsed CLI arguments");

    let mut config = CollectorConfig::load(args.config.as_deref())?;
    if !args.topics.is_empty() {
        config.topics = args.topics.clone();
    }

    // --- Date range ---
    let end_date = args.end_date.unwrap_or_else(|| Local::now().date_naive());
    let range = DateRange::new(args.start_date, end_date).inspect_err(|e| {
        error!(error = %e, "Refusing to start with an inverted date range");
    })?;
    if range.is_empty() {
        warn!(start = %range.start(), "Empty date range; nothing to collect");
    }
    info!(
        start = %range.start(),
        end = %range.end(),
        days = range.len(),
        topics = ?config.topics,
        "Collecting date range"
    );

    // --- Collaborators ---
    let store = build_store(&args, &config).await?;
    let extractor = if args.no_extract {
        warn!("Extraction disabled; no articles will be stored");
        AnyExtractor::Null(NullExtractor)
    } else {
        AnyExtractor::Html(HtmlExtractor::new(&config)?)
    };
    let source = GoogleNewsSource::new(&config)?;

    let pipeline = CollectionPipeline::new(source, extractor, store);
    let summary = pipeline.run(&range, &config.topics).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        stored = summary.stored,
        "Execution complete"
    );

    Ok(())
}

/// Pick the storage backend from the CLI; exactly one must be configured.
async fn build_store(args: &Cli, config: &CollectorConfig) -> Result<AnyStore, Box<dyn Error>> {
    if let Some(bucket) = &args.bucket {
        let endpoint = args.store_url.as_deref().ok_or(CollectError::MissingStore)?;
        let store = ObjectStore::new(endpoint, bucket.as_str(), args.store_token.clone(), config)?;
        info!(?store, "Using object store");
        return Ok(AnyStore::Object(store));
    }

    let Some(output_dir) = &args.output_dir else {
        return Err(CollectError::MissingStore.into());
    };

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    let store = LocalStore::new(output_dir);
    info!(root = %store.root().display(), "Using local store");
    Ok(AnyStore::Local(store))
}
