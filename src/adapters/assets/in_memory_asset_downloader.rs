//! In-memory asset downloader for testing.
//!
//! Serves registered bodies and counts fetches per URL.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{AssetDownload, AssetDownloader, AssetError};

#[derive(Debug, Clone)]
struct Asset {
    content_type: Option<String>,
    body: Bytes,
}

/// Asset downloader double. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetDownloader {
    assets: Arc<RwLock<HashMap<String, Asset>>>,
    fetches: Arc<RwLock<HashMap<String, usize>>>,
}

impl InMemoryAssetDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the body served for `url`.
    pub async fn insert(&self, url: &str, content_type: Option<&str>, body: impl Into<Bytes>) {
        self.assets.write().await.insert(
            url.to_string(),
            Asset {
                content_type: content_type.map(str::to_string),
                body: body.into(),
            },
        );
    }

    /// Number of fetches of `url`.
    pub async fn fetch_count(&self, url: &str) -> usize {
        self.fetches.read().await.get(url).copied().unwrap_or(0)
    }

    /// Number of fetches across all URLs.
    pub async fn total_fetches(&self) -> usize {
        self.fetches.read().await.values().sum()
    }
}

#[async_trait]
impl AssetDownloader for InMemoryAssetDownloader {
    async fn fetch(&self, url: &str) -> Result<AssetDownload, AssetError> {
        *self.fetches.write().await.entry(url.to_string()).or_default() += 1;

        let asset = self
            .assets
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| AssetError::Status {
                url: url.to_string(),
                status: 404,
            })?;

        let body = futures::stream::once(async move { Ok(asset.body) });
        Ok(AssetDownload {
            content_type: asset.content_type,
            body: Box::pin(body),
        })
    }
}
