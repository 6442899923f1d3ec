//! Per-request correlation context.

use std::collections::HashMap;

/// Context key under which the originating article URL is stored.
pub const ARTICLE_URL_KEY: &str = "article_url";

/// Key-value metadata attached to a single dispatched request.
///
/// Created when the article crawler dispatches a reference link, read back
/// by the paper crawler when the response is handled, then dropped.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read the value stored under `key`, or an empty string.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A reference-link request dispatched from the article crawler to the
/// paper crawler.
#[derive(Debug, Clone)]
pub struct PaperRequest {
    /// Target URL exactly as it appeared in the anchor's href
    pub url: String,

    /// Correlation metadata for this request
    pub context: Context,
}

impl PaperRequest {
    /// Build a request for `url` correlated to the article at `article_url`.
    pub fn new(url: impl Into<String>, article_url: &str) -> Self {
        let mut context = Context::new();
        context.put(ARTICLE_URL_KEY, article_url);
        Self {
            url: url.into(),
            context,
        }
    }
}
