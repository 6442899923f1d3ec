// src/utils/cache.rs

//! On-disk cache for fetched responses.
//!
//! Responses are stored one file per URL, keyed by the hex digest of the
//! URL, so repeated visits across poll cycles can skip the network.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A cached HTTP response with enough metadata to replay it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// File-backed response cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(hex::encode(digest))
    }

    /// Look up a previously stored response for `url`.
    pub async fn get(&self, url: &str) -> Option<CachedResponse> {
        let data = tokio::fs::read(self.path_for(url)).await.ok()?;
        serde_json::from_slice(&data).ok()
    }

    /// Store a response for `url`.
    pub async fn put(&self, url: &str, response: &CachedResponse) -> Result<()> {
        let data = serde_json::to_vec(response)?;
        tokio::fs::write(self.path_for(url), data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::open(tmp.path()).unwrap();

        let entry = CachedResponse {
            status: 200,
            content_type: "text/html".to_string(),
            body: "<html></html>".to_string(),
        };
        cache.put("https://example.com/a", &entry).await.unwrap();

        let loaded = cache.get("https://example.com/a").await.unwrap();
        assert_eq!(loaded.status, 200);
        assert_eq!(loaded.body, "<html></html>");
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::open(tmp.path()).unwrap();

        assert!(cache.get("https://example.com/unseen").await.is_none());
    }

    #[tokio::test]
    async fn test_distinct_urls_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::open(tmp.path()).unwrap();

        let a = CachedResponse {
            status: 200,
            content_type: String::new(),
            body: "a".to_string(),
        };
        let b = CachedResponse {
            status: 200,
            content_type: String::new(),
            body: "b".to_string(),
        };
        cache.put("https://example.com/a", &a).await.unwrap();
        cache.put("https://example.com/b", &b).await.unwrap();

        assert_eq!(cache.get("https://example.com/a").await.unwrap().body, "a");
        assert_eq!(cache.get("https://example.com/b").await.unwrap().body, "b");
    }
}
