// src/services/papers.rs

//! Paper metadata crawler service.
//!
//! Visits pages dispatched by the article crawler and inspects their
//! `<meta>` elements for a scholarly identifier.

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{ARTICLE_URL_KEY, Config, PaperRequest};
use crate::services::parse_selector;
use crate::utils::cache::ResponseCache;
use crate::utils::http;

/// Meta tag names recognized as identifier fields. Matching is
/// case-sensitive.
const IDENTIFIER_META_NAMES: [&str; 2] = ["dc.Identifier", "DOI"];

/// A discovered association between a news article and a paper identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The identifier read from the paper page's metadata
    pub identifier: String,

    /// URL of the article that linked the paper
    pub article_url: String,
}

/// Crawler for dispatched reference pages.
pub struct PaperCrawler {
    client: Client,
    cache: Option<ResponseCache>,
    meta: Selector,
}

impl PaperCrawler {
    /// Create a paper crawler from the shared configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            cache: http::open_cache(config)?,
            meta: parse_selector("meta")?,
        })
    }

    /// Visit a dispatched reference link and report any identifier found.
    ///
    /// Pages without a recognized identifier field produce `None`; that is
    /// the common case, not an error. A discovery is reported only when
    /// both the identifier and the correlated article URL are non-empty.
    pub async fn visit(&self, request: &PaperRequest) -> Result<Option<Discovery>> {
        Url::parse(&request.url)?;

        let page = http::fetch_page(&self.client, self.cache.as_ref(), &request.url).await?;
        let identifier = match self.extract_identifier(&page.body) {
            Some(identifier) => identifier,
            None => return Ok(None),
        };

        let article_url = request.context.get(ARTICLE_URL_KEY);
        if article_url.is_empty() {
            log::debug!("Identifier {} from {} has no correlated article", identifier, page.url);
            return Ok(None);
        }

        log::info!("Found doi {} associated with {}", identifier, article_url);
        Ok(Some(Discovery {
            identifier,
            article_url: article_url.to_string(),
        }))
    }

    /// Scan `<meta>` elements for the first recognized identifier field
    /// with a non-empty content attribute.
    fn extract_identifier(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        for element in document.select(&self.meta) {
            let name = element.value().attr("name").unwrap_or("");
            if IDENTIFIER_META_NAMES.contains(&name) {
                let content = element.value().attr("content").unwrap_or("").trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }
}
