//! Full-text extraction for candidate articles.
//!
//! The pipeline is handed an extractor at construction time. When extraction
//! is disabled a [`NullExtractor`] is installed, which fails every call, so
//! every candidate is dropped rather than stored without text.

pub mod html;

use crate::errors::ExtractError;

pub use html::HtmlExtractor;

/// Text pulled out of an article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// Headline found on the page, if any.
    pub title: Option<String>,
    /// Article body. Never empty for a successful extraction.
    pub text: String,
}

/// Downloads an article page and extracts its body text.
pub trait ArticleExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError>;
}

/// Extractor that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExtractor;

impl ArticleExtractor for NullExtractor {
    async fn extract(&self, _url: &str) -> Result<ExtractedArticle, ExtractError> {
        Err(ExtractError::Unavailable)
    }
}

/// Extractor chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyExtractor {
    Html(HtmlExtractor),
    Null(NullExtractor),
}

impl ArticleExtractor for AnyExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
        match self {
            AnyExtractor::Html(inner) => inner.extract(url).await,
            AnyExtractor::Null(inner) => inner.extract(url).await,
        }
    }
}
