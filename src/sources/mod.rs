//! News sources that list candidate articles per topic.
//!
//! A source only narrows results to a topic. Any date window it claims to
//! honour is approximate, so every candidate is re-validated by the
//! normalizer before it is stored.
//!
//! # Supported Sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News | [`google_news`] | Topic headline RSS feed |

pub mod google_news;

use crate::errors::SourceError;
use crate::models::{CandidateArticle, Topic};

pub use google_news::GoogleNewsSource;

/// Lists candidate articles for a topic.
pub trait ArticleSource {
    /// Fetch the current candidates for `topic`, in the order the source
    /// ranks them.
    async fn fetch(&self, topic: Topic) -> Result<Vec<CandidateArticle>, SourceError>;
}
