//! Command-line interface definitions for the news collector.
//!
//! All arguments can be provided via command-line flags or environment
//! variables (a `.env` file in the working directory is loaded first).

use crate::models::Topic;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a collection run.
///
/// # Examples
///
/// ```sh
/// # Collect one day into a local directory
/// news_collector --start-date 2023-06-01 --end-date 2023-06-02 -o ./articles
///
/// # Everything since START_DATE up to today, into an object store bucket
/// START_DATE=2023-06-01 news_collector --bucket news --store-url https://objects.example.com
///
/// # Only two topics
/// news_collector --start-date 2023-06-01 -o ./articles --topics technology,science
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First day to collect (inclusive), YYYY-MM-DD
    #[arg(short, long, env = "START_DATE")]
    pub start_date: NaiveDate,

    /// Day to stop at (exclusive), YYYY-MM-DD; defaults to today
    #[arg(short, long, env = "END_DATE")]
    pub end_date: Option<NaiveDate>,

    /// Comma-separated topics to collect; defaults to the config file's list
    #[arg(short, long, env = "TOPICS", value_delimiter = ',')]
    pub topics: Vec<Topic>,

    /// Directory for the local file store
    #[arg(short, long, env = "OUTPUT_DIR", conflicts_with = "bucket")]
    pub output_dir: Option<PathBuf>,

    /// Object store bucket
    #[arg(long, env = "S3_BUCKET", requires = "store_url")]
    pub bucket: Option<String>,

    /// Object store endpoint, e.g. https://objects.example.com
    #[arg(long, env = "OBJECT_STORE_URL")]
    pub store_url: Option<String>,

    /// Bearer token sent with object store writes
    #[arg(long, env = "OBJECT_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "NEWS_COLLECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip full-text extraction (every candidate is then dropped)
    #[arg(long)]
    pub no_extract: bool,
}
