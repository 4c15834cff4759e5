//! HTTP Asset Downloader - Streams remote asset bodies with reqwest.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::ports::{AssetDownload, AssetDownloader, AssetError};

/// Downloads assets over plain HTTP(S). Uploaded-file URLs from the content
/// service are pre-signed, so no credentials are sent.
#[derive(Debug, Clone)]
pub struct HttpAssetDownloader {
    client: Client,
}

impl HttpAssetDownloader {
    pub fn new(timeout: Duration) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssetError::download("", format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn parse_url(url: &str) -> Result<Url, AssetError> {
        let parsed = Url::parse(url).map_err(|_| AssetError::UnsupportedUrl {
            url: url.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            _ => Err(AssetError::UnsupportedUrl {
                url: url.to_string(),
            }),
        }
    }
}

/// MIME type of a `Content-Type` header value, lowercased and without
/// parameters.
pub(crate) fn media_type(header: &str) -> Option<String> {
    let essence = header.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_ascii_lowercase())
    }
}

#[async_trait]
impl AssetDownloader for HttpAssetDownloader {
    async fn fetch(&self, url: &str) -> Result<AssetDownload, AssetError> {
        let parsed = Self::parse_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AssetError::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(media_type);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)))
            .boxed();

        Ok(AssetDownload { content_type, body })
    }
}
