//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `notion` - Content service clients (HTTP, pooled, in-memory)
//! - `storage` - Exported files and the sync log (filesystem, in-memory)
//! - `assets` - Asset downloads and deduplicated storage

pub mod assets;
pub mod notion;
pub mod storage;

pub use assets::{HttpAssetDownloader, InMemoryAssetDownloader, StoredAssetResolver};
pub use notion::{ContentClientPool, InMemoryContentApi, NotionClientConfig, NotionHttpClient};
pub use storage::{
    InMemoryExportStorage, InMemorySyncLogStore, JsonSyncLogStore, LocalExportStorage,
};
