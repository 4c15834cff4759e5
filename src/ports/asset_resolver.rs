//! Asset ports - Materializing remote binary references as local files.

use async_trait::async_trait;
use thiserror::Error;

use super::export_storage::{ByteStream, StorageError};

/// Folder, relative to a document's folder, that holds its assets.
pub const ASSETS_FOLDER: &str = "assets";

/// Port for turning a remote asset URL into a local reference.
///
/// # Contract
///
/// - The local file is keyed by `(container, owner)`. When it already exists
///   the call returns it without touching the network.
/// - The file extension comes from the downloaded content type, never from
///   the URL.
/// - Success is only reported once the file is completely written.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(
        &self,
        container: &str,
        owner: &str,
        source_url: &str,
    ) -> Result<AssetReference, AssetError>;
}

/// Port for fetching a remote asset body.
#[async_trait]
pub trait AssetDownloader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<AssetDownload, AssetError>;
}

/// A fetched asset whose body has not been consumed yet.
pub struct AssetDownload {
    /// Declared MIME type, without parameters.
    pub content_type: Option<String>,
    pub body: ByteStream,
}

impl std::fmt::Debug for AssetDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDownload")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Location of an asset relative to the document that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    file_name: String,
}

impl AssetReference {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Unencoded relative path, e.g. `assets/Launch 1429.png`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", ASSETS_FOLDER, self.file_name)
    }

    /// Relative path with every segment percent-encoded, for use in links.
    pub fn encoded(&self) -> String {
        format!(
            "{}/{}",
            urlencoding::encode(ASSETS_FOLDER),
            urlencoding::encode(&self.file_name)
        )
    }
}

/// Errors that can occur while resolving an asset.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("Download of {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Unsupported asset URL: {url}")]
    UnsupportedUrl { url: String },

    #[error("Asset storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl AssetError {
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }
}
