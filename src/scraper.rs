// src/scraper.rs

//! Feed poller and crawl lifecycle control.
//!
//! [`Scraper`] owns the feed list and both crawlers and drives the
//! periodic scrape loop. [`ScraperHandle`] lets another task stop the
//! loop and wait for it to finish.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::models::{Config, PaperRequest};
use crate::services::{ArticleCrawler, PaperCrawler, VisitStats};

/// Counters for one scrape pass across both crawlers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Pages fetched by the article crawler (feeds and articles)
    pub pages: usize,
    /// Feed entries seen
    pub items: usize,
    /// Article pages recognized
    pub articles: usize,
    /// Reference links dispatched to the paper crawler
    pub dispatched: usize,
    /// Dispatched requests the paper crawler processed
    pub paper_visits: usize,
    /// Identifier associations discovered
    pub identifiers: usize,
    /// Failed visits across both crawlers
    pub failures: usize,
}

impl ScrapeStats {
    fn absorb(&mut self, visit: VisitStats) {
        self.pages += visit.pages;
        self.items += visit.items;
        self.articles += visit.articles;
        self.dispatched += visit.dispatched;
        self.failures += visit.failures;
    }
}

/// Periodic feed poller wiring the article and paper crawlers together.
pub struct Scraper {
    feeds: Vec<String>,
    interval: Duration,
    max_concurrent: usize,
    articles: ArticleCrawler,
    papers: PaperCrawler,
    stop_rx: mpsc::Receiver<()>,
    finished_tx: mpsc::Sender<()>,
}

/// Control handle for a running [`Scraper`].
pub struct ScraperHandle {
    stop_tx: mpsc::Sender<()>,
    finished_rx: mpsc::Receiver<()>,
}

impl Scraper {
    /// Build a scraper and its control handle from the configuration.
    ///
    /// Both crawlers get their own client built from the same settings,
    /// so neither can affect the other's transport at runtime.
    pub fn new(config: Config) -> Result<(Self, ScraperHandle)> {
        config.validate()?;
        let articles = ArticleCrawler::new(&config)?;
        let papers = PaperCrawler::new(&config)?;

        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (finished_tx, finished_rx) = mpsc::channel(1);

        let scraper = Self {
            feeds: config.feeds,
            interval: Duration::from_secs(config.interval_secs),
            max_concurrent: config.max_concurrent,
            articles,
            papers,
            stop_rx,
            finished_tx,
        };
        let handle = ScraperHandle {
            stop_tx,
            finished_rx,
        };
        Ok((scraper, handle))
    }

    /// Register another feed URL to visit on every pass.
    ///
    /// Duplicates are kept and visited once each per pass.
    pub fn add_feed(&mut self, url: impl Into<String>) {
        self.feeds.push(url.into());
    }

    /// Run the poll loop until stopped.
    ///
    /// Intended to be spawned on its own task; consumes the scraper so a
    /// second invocation is impossible. A stop request is honored at the
    /// next loop-top check, so shutdown latency is bounded by one scrape
    /// pass plus the sleep interval. The finished notification is posted
    /// exactly once, after the loop exits.
    pub async fn run(mut self) {
        loop {
            if self.stop_rx.try_recv().is_ok() {
                log::info!("Stopping crawler...");
                break;
            }

            self.scrape_pass().await;

            tokio::time::sleep(self.interval).await;
        }

        log::info!("Crawler stopped... notifying listeners...");
        let _ = self.finished_tx.send(()).await;
    }

    /// Visit every registered feed once and drain all resulting requests.
    ///
    /// Article visits and dispatched paper visits run concurrently; the
    /// pass completes when both sides are fully drained.
    pub async fn scrape_pass(&self) -> ScrapeStats {
        log::info!("Starting scrape pass over {} feeds", self.feeds.len());

        let (dispatch, rx) = mpsc::unbounded_channel();

        let article_work = async move {
            let results = stream::iter(self.feeds.iter().cloned())
                .map(|feed| {
                    let dispatch = dispatch.clone();
                    async move { self.articles.visit(&feed, &dispatch).await }
                })
                .buffer_unordered(self.max_concurrent)
                .collect::<Vec<_>>()
                .await;
            // The last sender must go away for the paper side to drain.
            drop(dispatch);
            results
        };
        let paper_work = consume_papers(&self.papers, rx, self.max_concurrent);

        let (article_results, (paper_visits, identifiers, paper_failures)) =
            tokio::join!(article_work, paper_work);

        let mut stats = ScrapeStats::default();
        for visit in article_results {
            stats.absorb(visit);
        }
        stats.paper_visits = paper_visits;
        stats.identifiers = identifiers;
        stats.failures += paper_failures;

        log::info!(
            "Scrape pass complete: {} pages, {} feed items, {} articles, {} references, {} identifiers, {} failures",
            stats.pages,
            stats.items,
            stats.articles,
            stats.dispatched,
            stats.identifiers,
            stats.failures
        );
        stats
    }
}

impl ScraperHandle {
    /// Ask the poll loop to stop after its current iteration.
    ///
    /// Non-blocking; redundant requests are dropped.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Block until the poll loop has fully stopped.
    pub async fn wait(&mut self) {
        let _ = self.finished_rx.recv().await;
    }
}

/// Process dispatched paper requests until the channel closes.
///
/// Returns (visits, identifiers found, failures).
async fn consume_papers(
    papers: &PaperCrawler,
    rx: mpsc::UnboundedReceiver<PaperRequest>,
    max_concurrent: usize,
) -> (usize, usize, usize) {
    let requests = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|request| (request, rx))
    });
    let results = requests
        .map(|request| async move { papers.visit(&request).await })
        .buffer_unordered(max_concurrent);
    futures::pin_mut!(results);

    let (mut visits, mut identifiers, mut failures) = (0, 0, 0);
    while let Some(result) = results.next().await {
        visits += 1;
        match result {
            Ok(Some(_)) => identifiers += 1,
            Ok(None) => {}
            Err(error) => {
                log::warn!("Something went wrong: {}", error);
                failures += 1;
            }
        }
    }
    (visits, identifiers, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        Config {
            cache_dir: String::new(),
            interval_secs: 1,
            ..Config::default()
        }
    }

    fn feed_body(article_url: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <item><title>T</title><link>{}</link></item>\
             </channel></rss>",
            article_url
        )
    }

    fn article_page(paper_url: &str) -> String {
        format!(
            r#"<html><body><div id="wrapper">
                <div class="article"><h1 class="page_title">T</h1></div>
                <div id="sidebar-content">
                  <a rel="nofollow" href="{}">Paper</a>
                </div>
            </div></body></html>"#,
            paper_url
        )
    }

    const PAPER_PAGE: &str =
        r#"<html><head><meta name="dc.Identifier" content="10.1/xyz"></head></html>"#;

    async fn mount_pipeline(server: &MockServer, expected_visits: u64) {
        let article_url = format!("{}/a", server.uri());
        let paper_url = format!("{}/p1", server.uri());

        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(feed_body(&article_url))
                    .insert_header("content-type", "application/rss+xml"),
            )
            .expect(expected_visits)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(article_page(&paper_url))
                    .insert_header("content-type", "text/html"),
            )
            .expect(expected_visits)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAPER_PAGE)
                    .insert_header("content-type", "text/html"),
            )
            .expect(expected_visits)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_add_feed_allows_duplicates() {
        let (mut scraper, _handle) = Scraper::new(test_config()).unwrap();
        scraper.add_feed("https://example.com/rss");
        scraper.add_feed("https://example.com/rss");
        assert_eq!(scraper.feeds.len(), 2);
    }

    #[tokio::test]
    async fn test_stop_then_wait_finishes() {
        let (scraper, mut handle) = Scraper::new(test_config()).unwrap();
        let poller = tokio::spawn(scraper.run());

        handle.stop();
        timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("poller did not finish after stop");
        poller.await.unwrap();

        // The finished notification was consumed by wait() and is never
        // posted a second time.
        assert!(handle.finished_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wait_does_not_return_before_stop() {
        let (scraper, mut handle) = Scraper::new(test_config()).unwrap();
        tokio::spawn(scraper.run());

        assert!(
            timeout(Duration::from_millis(200), handle.wait())
                .await
                .is_err()
        );

        handle.stop();
        timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("poller did not finish after stop");
    }

    #[tokio::test]
    async fn test_end_to_end_pass() {
        let server = MockServer::start().await;
        mount_pipeline(&server, 1).await;

        let mut config = test_config();
        config.feeds = vec![format!("{}/feed", server.uri())];
        let (scraper, _handle) = Scraper::new(config).unwrap();

        let stats = scraper.scrape_pass().await;

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.items, 1);
        assert_eq!(stats.articles, 1);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.paper_visits, 1);
        assert_eq!(stats.identifiers, 1);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_repeated_passes_dispatch_identically() {
        let server = MockServer::start().await;
        mount_pipeline(&server, 2).await;

        let mut config = test_config();
        config.feeds = vec![format!("{}/feed", server.uri())];
        let (scraper, _handle) = Scraper::new(config).unwrap();

        let first = scraper.scrape_pass().await;
        let second = scraper.scrape_pass().await;

        assert_eq!(first, second);
        assert_eq!(first.dispatched, 1);
    }

    #[tokio::test]
    async fn test_duplicate_feeds_are_visited_twice_per_pass() {
        let server = MockServer::start().await;
        mount_pipeline(&server, 2).await;

        let mut config = test_config();
        let feed_url = format!("{}/feed", server.uri());
        config.feeds = vec![feed_url.clone(), feed_url];
        let (scraper, _handle) = Scraper::new(config).unwrap();

        let stats = scraper.scrape_pass().await;

        assert_eq!(stats.items, 2);
        assert_eq!(stats.identifiers, 2);
    }
}
