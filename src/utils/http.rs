// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::cache::{CachedResponse, ResponseCache};

/// A fetched page body plus the response metadata the crawlers dispatch on.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Response body
    pub body: String,
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.ignore_tls)
        .build()?;
    Ok(client)
}

/// Open the response cache named by the configuration, if caching is
/// enabled (`cache_dir` non-empty).
pub fn open_cache(config: &Config) -> Result<Option<ResponseCache>> {
    if config.cache_dir.is_empty() {
        return Ok(None);
    }
    Ok(Some(ResponseCache::open(&config.cache_dir)?))
}

/// Fetch `url`, serving from `cache` when a stored response exists.
///
/// Every received response is recorded at debug level with its status.
/// Non-2xx statuses are errors.
pub async fn fetch_page(
    client: &Client,
    cache: Option<&ResponseCache>,
    url: &str,
) -> Result<Page> {
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(url).await {
            log::debug!("Cache hit for {}", url);
            return Ok(Page {
                url: url.to_string(),
                status: hit.status,
                content_type: hit.content_type,
                body: hit.body,
            });
        }
    }

    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    log::debug!("Response from {}: Status <{}>", url, status);

    if !response.status().is_success() {
        return Err(AppError::Status {
            url: url.to_string(),
            status,
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let final_url = response.url().to_string();
    let body = response.text().await?;

    if let Some(cache) = cache {
        let entry = CachedResponse {
            status,
            content_type: content_type.clone(),
            body: body.clone(),
        };
        if let Err(error) = cache.put(url, &entry).await {
            log::warn!("Failed to cache response for {}: {}", url, error);
        }
    }

    Ok(Page {
        url: final_url,
        status,
        content_type,
        body,
    })
}
