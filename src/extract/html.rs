//! Paragraph-based extraction from article HTML.
//!
//! The body is the text of the `<p>` elements inside a main-content
//! container: `<article>`, `<main>`, `[role="main"]` or
//! `[itemprop="articleBody"]`. Paragraphs nested in `<nav>`, `<header>`,
//! `<footer>`, `<aside>` or `<form>` are page chrome and are skipped even
//! inside a container. A page with no such paragraphs has no body; loose
//! `<p>` elements elsewhere (paywall prompts, cookie banners, copyright
//! lines) are never used as article text.

use crate::config::CollectorConfig;
use crate::errors::ExtractError;
use crate::extract::{ArticleExtractor, ExtractedArticle};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{info, instrument};

static CONTENT_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"article p, main p, [role="main"] p, [itemprop="articleBody"] p"#,
    )
    .unwrap()
});
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static PAGE_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Elements whose paragraphs are navigation or boilerplate, not story text.
const CHROME_ELEMENTS: [&str; 5] = ["nav", "header", "footer", "aside", "form"];

/// Downloads pages with reqwest and extracts paragraphs with `scraper`.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new(config: &CollectorConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl ArticleExtractor for HtmlExtractor {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let article = parse_article(&body)?;
        info!(bytes = article.text.len(), "Extracted article text");
        Ok(article)
    }
}

/// Extract the headline and body paragraphs from an HTML document.
pub fn parse_article(html: &str) -> Result<ExtractedArticle, ExtractError> {
    let document = Html::parse_document(html);

    let paragraphs = collect_paragraphs(&document);
    if paragraphs.is_empty() {
        return Err(ExtractError::EmptyBody);
    }

    Ok(ExtractedArticle {
        title: find_title(&document),
        text: paragraphs.join("\n\n"),
    })
}

fn collect_paragraphs(document: &Html) -> Vec<String> {
    document
        .select(&CONTENT_PARAGRAPHS)
        .filter(|p| !inside_chrome(p))
        .map(|p| collapse_whitespace(&p.text().collect::<Vec<_>>().join(" ")))
        .filter(|p| !p.is_empty())
        .collect()
}

fn inside_chrome(paragraph: &ElementRef<'_>) -> bool {
    paragraph.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| CHROME_ELEMENTS.contains(&e.name()))
    })
}

fn find_title(document: &Html) -> Option<String> {
    let og = document
        .select(&OG_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty());

    og.or_else(|| {
        [&*HEADLINE, &*PAGE_TITLE].into_iter().find_map(|selector| {
            document
                .select(selector)
                .map(|e| collapse_whitespace(&e.text().collect::<String>()))
                .find(|t| !t.is_empty())
        })
    })
}
