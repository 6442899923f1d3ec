// src/services/articles.rs

//! News article crawler service.
//!
//! Visits feed URLs, follows each feed entry to its article page, and
//! dispatches the article's outbound reference links to the paper crawler.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;
use crate::models::{Config, PaperRequest};
use crate::services::{feeds, parse_selector};
use crate::utils::cache::ResponseCache;
use crate::utils::http::{self, Page};

/// Counters accumulated over one visit cascade.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisitStats {
    /// Pages fetched (feeds and articles)
    pub pages: usize,
    /// Feed entries seen
    pub items: usize,
    /// Article pages recognized by the wrapper selector
    pub articles: usize,
    /// Reference links dispatched to the paper crawler
    pub dispatched: usize,
    /// Failed visits
    pub failures: usize,
}

impl VisitStats {
    /// Fold another cascade's counters into this one.
    pub fn merge(&mut self, other: VisitStats) {
        self.pages += other.pages;
        self.items += other.items;
        self.articles += other.articles;
        self.dispatched += other.dispatched;
        self.failures += other.failures;
    }
}

/// Crawler for feed documents and the article pages they link to.
pub struct ArticleCrawler {
    client: Client,
    cache: Option<ResponseCache>,
    wrapper: Selector,
    title: Selector,
    references: Selector,
    max_concurrent: usize,
}

impl ArticleCrawler {
    /// Create an article crawler from the shared configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            cache: http::open_cache(config)?,
            wrapper: parse_selector(&config.selectors.article_wrapper)?,
            title: parse_selector(&config.selectors.article_title)?,
            references: parse_selector(&config.selectors.reference_links)?,
            max_concurrent: config.max_concurrent,
        })
    }

    /// Visit `url` and cascade through whatever it turns out to be.
    ///
    /// Feed documents recurse into every entry link through this same
    /// pipeline; article pages send one [`PaperRequest`] per qualifying
    /// reference anchor through `dispatch`. Failures are logged and
    /// counted, never propagated.
    pub fn visit<'a>(
        &'a self,
        url: &'a str,
        dispatch: &'a UnboundedSender<PaperRequest>,
    ) -> BoxFuture<'a, VisitStats> {
        Box::pin(async move {
            let mut stats = VisitStats::default();
            log::debug!("Visiting {}", url);

            let page = match http::fetch_page(&self.client, self.cache.as_ref(), url).await {
                Ok(page) => page,
                Err(error) => {
                    log::warn!("Something went wrong: {}", error);
                    stats.failures += 1;
                    return stats;
                }
            };
            stats.pages += 1;

            if feeds::looks_like_feed(&page.content_type, &page.body) {
                self.handle_feed(&page, dispatch, &mut stats).await;
            } else {
                self.handle_article(&page, dispatch, &mut stats);
            }
            stats
        })
    }

    /// Visit every entry of a feed document, bounded by `max_concurrent`.
    async fn handle_feed(
        &self,
        page: &Page,
        dispatch: &UnboundedSender<PaperRequest>,
        stats: &mut VisitStats,
    ) {
        let items = match feeds::parse_feed(&page.body) {
            Ok(items) => items,
            Err(error) => {
                log::warn!("Something went wrong: {}", error);
                stats.failures += 1;
                return;
            }
        };

        for item in &items {
            log::info!("found item {}", item.title);
        }
        stats.items += items.len();

        let children = stream::iter(items)
            .map(|item| async move { self.visit(&item.link, dispatch).await })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;
        for child in children {
            stats.merge(child);
        }
    }

    /// Extract the title and reference links from an article page.
    ///
    /// Pages without the wrapper region are ignored. Anchors are
    /// dispatched with whatever href they carry, including an empty one;
    /// invalid targets fail downstream in the paper crawler.
    fn handle_article(
        &self,
        page: &Page,
        dispatch: &UnboundedSender<PaperRequest>,
        stats: &mut VisitStats,
    ) {
        let document = Html::parse_document(&page.body);
        let Some(wrapper) = document.select(&self.wrapper).next() else {
            log::debug!("No article wrapper found at {}", page.url);
            return;
        };
        stats.articles += 1;

        let title = wrapper
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        log::info!("News article {}", title);

        for anchor in wrapper.select(&self.references) {
            let href = anchor.value().attr("href").unwrap_or("");
            let request = PaperRequest::new(href, &page.url);
            if dispatch.send(request).is_err() {
                log::warn!("Paper crawler is no longer accepting requests");
                return;
            }
            stats.dispatched += 1;
        }
    }
}
