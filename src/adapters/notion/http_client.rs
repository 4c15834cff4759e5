//! Notion HTTP Client - Implementation of ContentApi over the public REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = NotionClientConfig::new(api_key)
//!     .with_base_url("https://api.notion.com")
//!     .with_page_size(100);
//!
//! let client = NotionHttpClient::new(config)?;
//! ```
//!
//! Listings (source queries and block children) are paginated by the
//! service; the client follows `next_cursor` until `has_more` is false.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::wire::{
    QueryRequest, QuerySort, RawBlock, RawDatabase, RawErrorBody, RawList, RawObjectRef, RawPage,
};
use crate::domain::content::{ContentBlock, PageMetadata, SourceMetadata};
use crate::domain::foundation::{BlockId, PageId, SourceId};
use crate::ports::{ContentApi, ContentApiError, SourceQuery};

/// Default API version header value.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Maximum page size accepted by the service.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration for one credentialed client.
#[derive(Debug, Clone)]
pub struct NotionClientConfig {
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.notion.com).
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
    pub timeout: Duration,
    /// Items requested per listing call.
    pub page_size: u32,
}

impl NotionClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.notion.com".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the listing page size, clamped to 1..=100.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Content API client for one API key.
pub struct NotionHttpClient {
    config: NotionClientConfig,
    client: Client,
}

impl NotionHttpClient {
    pub fn new(config: NotionClientConfig) -> Result<Self, ContentApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ContentApiError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.config.api_key())
            .header("Notion-Version", &self.config.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ContentApiError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ContentApiError::Network(e.to_string()))?;
        let response = Self::handle_response_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ContentApiError::Parse(e.to_string()))
    }

    /// Maps non-success statuses to errors.
    async fn handle_response_status(response: Response) -> Result<Response, ContentApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RawErrorBody>(&body)
            .map(|e| {
                if e.code.is_empty() {
                    e.message
                } else {
                    format!("{}: {}", e.code, e.message)
                }
            })
            .unwrap_or(body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ContentApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ContentApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ContentApiError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(1),
            },
            s if s.is_server_error() => ContentApiError::Unavailable(format!("{}: {}", s, message)),
            s => ContentApiError::Status {
                status: s.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ContentApi for NotionHttpClient {
    async fn query_source(
        &self,
        source_id: &SourceId,
        query: &SourceQuery,
    ) -> Result<Vec<PageId>, ContentApiError> {
        let url = self.url(&format!("databases/{}/query", source_id));
        let sorts: Vec<QuerySort<'_>> = query
            .sort_property
            .as_deref()
            .map(|property| QuerySort {
                property,
                direction: query.direction,
            })
            .into_iter()
            .collect();

        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let body = QueryRequest {
                page_size: self.config.page_size,
                start_cursor: cursor.as_deref(),
                sorts: sorts.clone(),
            };
            let page: RawList<RawObjectRef> = self.send(self.client.post(&url).json(&body)).await?;

            for item in &page.results {
                ids.push(
                    PageId::parse(&item.id)
                        .map_err(|e| ContentApiError::Parse(format!("page id: {}", e)))?,
                );
            }
            match page.continuation() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }
        Ok(ids)
    }

    async fn get_source(&self, source_id: &SourceId) -> Result<SourceMetadata, ContentApiError> {
        let url = self.url(&format!("databases/{}", source_id));
        let raw: RawDatabase = self.send(self.client.get(url)).await?;
        raw.into_metadata()
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageMetadata, ContentApiError> {
        let url = self.url(&format!("pages/{}", page_id));
        let raw: RawPage = self.send(self.client.get(url)).await?;
        raw.into_metadata()
    }

    async fn get_block_children(
        &self,
        block_id: &BlockId,
    ) -> Result<Vec<ContentBlock>, ContentApiError> {
        let url = self.url(&format!("blocks/{}/children", block_id));
        let page_size = self.config.page_size.to_string();

        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params = vec![("page_size", page_size.clone())];
            if let Some(cursor) = &cursor {
                params.push(("start_cursor", cursor.clone()));
            }
            let page: RawList<RawBlock> = self.send(self.client.get(&url).query(&params)).await?;
            let next = page.continuation().map(str::to_string);

            for raw in page.results {
                blocks.push(raw.into_block()?);
            }
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(blocks)
    }
}
