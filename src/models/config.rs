//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Field aliases accept the camel-case spellings used by older config
/// files (`UserAgent`, `CacheDir`, `IgnoreTLS`, `Debug`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent", alias = "UserAgent")]
    pub user_agent: String,

    /// Directory for cached responses; an empty string disables caching
    #[serde(default = "defaults::cache_dir", alias = "CacheDir")]
    pub cache_dir: String,

    /// Skip TLS certificate verification for all outbound requests
    #[serde(default, alias = "IgnoreTLS")]
    pub ignore_tls: bool,

    /// Raise log verbosity to debug
    #[serde(default, alias = "Debug")]
    pub debug: bool,

    /// Seconds to sleep between scrape passes
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent requests per crawler
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Feed URLs visited on every scrape pass
    #[serde(default)]
    pub feeds: Vec<String>,

    /// CSS selectors locating the article page regions
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("user_agent is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("timeout_secs must be > 0"));
        }
        if self.interval_secs == 0 {
            return Err(AppError::validation("interval_secs must be > 0"));
        }
        if self.max_concurrent == 0 {
            return Err(AppError::validation("max_concurrent must be > 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            cache_dir: defaults::cache_dir(),
            ignore_tls: false,
            debug: false,
            interval_secs: defaults::interval(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            feeds: Vec::new(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors for the regions of interest on an article page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Content wrapper that marks a page as a news article
    #[serde(default = "defaults::article_wrapper")]
    pub article_wrapper: String,

    /// Title element inside the wrapper
    #[serde(default = "defaults::article_title")]
    pub article_title: String,

    /// Outbound reference anchors in the sidebar
    #[serde(default = "defaults::reference_links")]
    pub reference_links: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            article_wrapper: defaults::article_wrapper(),
            article_title: defaults::article_title(),
            reference_links: defaults::reference_links(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:68.0) Gecko/20100101 Firefox/68.0".into()
    }
    pub fn cache_dir() -> String {
        "cache".into()
    }
    pub fn interval() -> u64 {
        10
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Selector defaults
    pub fn article_wrapper() -> String {
        "#wrapper".into()
    }
    pub fn article_title() -> String {
        ".article h1.page_title".into()
    }
    pub fn reference_links() -> String {
        "#sidebar-content a[rel='nofollow']".into()
    }
}
