//! Asset adapters: downloading remote bodies and storing them once.

mod http_asset_downloader;
mod in_memory_asset_downloader;
mod stored_asset_resolver;

pub use http_asset_downloader::HttpAssetDownloader;
pub use in_memory_asset_downloader::InMemoryAssetDownloader;
pub use stored_asset_resolver::{extension_for, StoredAssetResolver};
