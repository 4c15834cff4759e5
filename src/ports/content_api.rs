//! Content API Port - Read access to the remote content service.
//!
//! Every call is a network round trip. Implementations do not retry; callers
//! decide what a failure means for their unit of work.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::content::{ContentBlock, PageMetadata, SourceMetadata};
use crate::domain::foundation::{BlockId, PageId, SourceId};

/// Order of a source query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Parameters of a source query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceQuery {
    /// Property to sort by. `None` keeps the service's default order.
    pub sort_property: Option<String>,
    pub direction: SortDirection,
}

impl SourceQuery {
    pub fn sorted_by(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort_property: Some(property.into()),
            direction,
        }
    }
}

/// Port for reading sources, pages and blocks.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Returns the ids of every page in a source, in query order, following
    /// pagination to the end.
    async fn query_source(
        &self,
        source_id: &SourceId,
        query: &SourceQuery,
    ) -> Result<Vec<PageId>, ContentApiError>;

    async fn get_source(&self, source_id: &SourceId) -> Result<SourceMetadata, ContentApiError>;

    async fn get_page(&self, page_id: &PageId) -> Result<PageMetadata, ContentApiError>;

    /// Returns every child of a block in server order, following pagination
    /// to the end.
    async fn get_block_children(
        &self,
        block_id: &BlockId,
    ) -> Result<Vec<ContentBlock>, ContentApiError>;
}

/// Errors from the content service.
#[derive(Debug, Clone, Error)]
pub enum ContentApiError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Content service unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ContentApiError {
    /// Whether a later attempt could succeed without a configuration change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ContentApiError::RateLimited { .. }
                | ContentApiError::Unavailable(_)
                | ContentApiError::Network(_)
        )
    }
}
