//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ContentApi` - Read access to sources, pages and blocks
//! - `ExportStorage` - Writing documents and assets
//! - `AssetResolver` / `AssetDownloader` - Local copies of remote assets
//! - `SyncLogStore` - Persistence of the export ledger

mod asset_resolver;
mod content_api;
mod export_storage;
mod sync_log_store;

pub use asset_resolver::{
    AssetDownload, AssetDownloader, AssetError, AssetReference, AssetResolver, ASSETS_FOLDER,
};
pub use content_api::{ContentApi, ContentApiError, SortDirection, SourceQuery};
pub use export_storage::{
    file_name_with_extension, validate_folder, validate_segment, ByteStream, ExportStorage,
    FileInfo, FilePath, StorageError,
};
pub use sync_log_store::{SyncLogError, SyncLogStore};
