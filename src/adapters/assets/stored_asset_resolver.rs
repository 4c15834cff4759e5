//! Stored Asset Resolver - Downloads each asset once into the export storage.
//!
//! Assets live next to the documents that reference them:
//!
//! ```text
//! {container}/assets/{owner}.{ext}
//! ```
//!
//! The owner is derived from the referencing page and block, so the same
//! block resolves to the same file on every run. A file already present
//! under the owner's name is returned without a download, whatever its
//! extension.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{
    AssetDownloader, AssetError, AssetReference, AssetResolver, ExportStorage, ASSETS_FOLDER,
};

/// Extension used when the content type is missing or unknown.
const FALLBACK_EXTENSION: &str = "bin";

/// Resolves assets through an [`AssetDownloader`] into an [`ExportStorage`].
#[derive(Clone)]
pub struct StoredAssetResolver {
    storage: Arc<dyn ExportStorage>,
    downloader: Arc<dyn AssetDownloader>,
}

impl StoredAssetResolver {
    pub fn new(storage: Arc<dyn ExportStorage>, downloader: Arc<dyn AssetDownloader>) -> Self {
        Self {
            storage,
            downloader,
        }
    }

    fn assets_folder(container: &str) -> String {
        if container.is_empty() {
            ASSETS_FOLDER.to_string()
        } else {
            format!("{}/{}", container, ASSETS_FOLDER)
        }
    }
}

/// File extension for a MIME type.
pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let Some(content_type) = content_type else {
        return FALLBACK_EXTENSION;
    };

    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "audio/mpeg" => "mp3",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|extensions| extensions.first().copied())
            .unwrap_or(FALLBACK_EXTENSION),
    }
}

#[async_trait]
impl AssetResolver for StoredAssetResolver {
    async fn resolve(
        &self,
        container: &str,
        owner: &str,
        source_url: &str,
    ) -> Result<AssetReference, AssetError> {
        let folder = Self::assets_folder(container);

        if let Some(existing) = self.storage.find_by_stem(&folder, owner).await? {
            tracing::debug!(folder = %folder, file = %existing, "Asset already downloaded");
            return Ok(AssetReference::new(existing));
        }

        tracing::debug!(folder = %folder, owner = %owner, "Downloading asset");
        let download = self.downloader.fetch(source_url).await?;
        let extension = extension_for(download.content_type.as_deref());
        let file_name = format!("{}.{}", owner, extension);

        self.storage
            .write_stream(&folder, &file_name, download.body)
            .await?;

        Ok(AssetReference::new(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::assets::InMemoryAssetDownloader;
    use crate::adapters::storage::InMemoryExportStorage;

    const URL: &str = "https://files.example.com/secure/abc/photo?X-Amz-Signature=1";

    async fn setup() -> (StoredAssetResolver, InMemoryExportStorage, InMemoryAssetDownloader) {
        let storage = InMemoryExportStorage::new();
        let downloader = InMemoryAssetDownloader::new();
        downloader
            .insert(URL, Some("image/png"), &b"\x89PNG"[..])
            .await;
        let resolver = StoredAssetResolver::new(
            Arc::new(storage.clone()),
            Arc::new(downloader.clone()),
        );
        (resolver, storage, downloader)
    }

    #[test]
    fn extension_comes_from_content_type() {
        assert_eq!(extension_for(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(Some("application/pdf")), "pdf");
        assert_eq!(extension_for(Some("text/csv")), "csv");
        assert_eq!(extension_for(Some("application/x-unknown-thing")), "bin");
        assert_eq!(extension_for(None), "bin");
    }

    #[tokio::test]
    async fn first_resolve_downloads_into_assets_folder() {
        let (resolver, storage, downloader) = setup().await;

        let reference = resolver.resolve("Projects", "Launch abc", URL).await.unwrap();

        assert_eq!(reference.file_name(), "Launch abc.png");
        assert_eq!(downloader.fetch_count(URL).await, 1);
        assert!(storage
            .exists("Projects/assets", "Launch abc.png")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn second_resolve_reuses_file() {
        let (resolver, storage, downloader) = setup().await;

        let first = resolver.resolve("Projects", "Launch abc", URL).await.unwrap();
        let second = resolver.resolve("Projects", "Launch abc", URL).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(downloader.fetch_count(URL).await, 1);
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn failed_download_leaves_no_file() {
        let (resolver, storage, _) = setup().await;

        let result = resolver
            .resolve("Projects", "Missing", "https://files.example.com/gone")
            .await;

        assert!(matches!(result, Err(AssetError::Status { status: 404, .. })));
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_owner_is_a_storage_error() {
        let (resolver, _, _) = setup().await;
        let result = resolver.resolve("Projects", "../escape", URL).await;
        assert!(matches!(result, Err(AssetError::Storage(_))));
    }
}
