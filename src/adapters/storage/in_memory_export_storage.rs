//! In-Memory Export Storage Adapter
//!
//! Keeps exported files in memory and counts writes.
//! Useful for testing.

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    file_name_with_extension, validate_folder, validate_segment, ByteStream, ExportStorage,
    FileInfo, FilePath, StorageError,
};

#[derive(Debug, Clone)]
struct StoredFile {
    content: Vec<u8>,
    modified_at: Timestamp,
}

/// In-memory storage for exported output
#[derive(Debug, Clone, Default)]
pub struct InMemoryExportStorage {
    files: Arc<RwLock<BTreeMap<(String, String), StoredFile>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryExportStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns a stored file as text.
    pub async fn read_text(&self, folder: &str, file_name: &str) -> Option<String> {
        let files = self.files.read().await;
        files
            .get(&(folder.to_string(), file_name.to_string()))
            .map(|f| String::from_utf8_lossy(&f.content).to_string())
    }

    /// Number of stored files.
    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    fn path(folder: &str, file_name: &str) -> FilePath {
        if folder.is_empty() {
            FilePath::from(file_name)
        } else {
            FilePath::new(format!("{}/{}", folder, file_name))
        }
    }

    async fn store(&self, folder: &str, file_name: &str, content: Vec<u8>) -> FilePath {
        let mut files = self.files.write().await;
        files.insert(
            (folder.to_string(), file_name.to_string()),
            StoredFile {
                content,
                modified_at: Timestamp::now(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Self::path(folder, file_name)
    }
}

#[async_trait]
impl ExportStorage for InMemoryExportStorage {
    async fn write_text(
        &self,
        folder: &str,
        name: &str,
        extension: &str,
        content: &str,
    ) -> Result<FilePath, StorageError> {
        validate_folder(folder)?;
        let file_name = file_name_with_extension(name, extension);
        validate_segment(&file_name)?;
        Ok(self.store(folder, &file_name, content.as_bytes().to_vec()).await)
    }

    async fn write_stream(
        &self,
        folder: &str,
        file_name: &str,
        mut body: ByteStream,
    ) -> Result<FilePath, StorageError> {
        validate_folder(folder)?;
        validate_segment(file_name)?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(self.store(folder, file_name, buffer.to_vec()).await)
    }

    async fn exists(&self, folder: &str, file_name: &str) -> Result<bool, StorageError> {
        let files = self.files.read().await;
        Ok(files.contains_key(&(folder.to_string(), file_name.to_string())))
    }

    async fn find_by_stem(&self, folder: &str, stem: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .list(folder)
            .await?
            .into_iter()
            .find(|info| info.stem() == stem)
            .map(|info| info.name))
    }

    async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, StorageError> {
        let files = self.files.read().await;
        Ok(files
            .iter()
            .filter(|((f, _), _)| f == folder)
            .map(|((f, name), file)| FileInfo {
                name: name.clone(),
                path: Self::path(f, name),
                size_bytes: file.content.len() as u64,
                modified_at: file.modified_at,
            })
            .collect())
    }

    async fn delete(&self, folder: &str, file_name: &str) -> Result<(), StorageError> {
        let mut files = self.files.write().await;
        files
            .remove(&(folder.to_string(), file_name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(Self::path(folder, file_name).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_back() {
        let storage = InMemoryExportStorage::new();
        let path = storage.write_text("P", "a", "md", "hello").await.unwrap();

        assert_eq!(path.to_string(), "P/a.md");
        assert_eq!(storage.read_text("P", "a.md").await.as_deref(), Some("hello"));
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn failed_stream_stores_nothing() {
        let storage = InMemoryExportStorage::new();
        let body: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(bytes::Bytes::from_static(b"ab")),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "cut")),
        ]));

        assert!(storage.write_stream("P", "x.bin", body).await.is_err());
        assert_eq!(storage.file_count().await, 0);
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn list_is_scoped_to_folder() {
        let storage = InMemoryExportStorage::new();
        storage.write_text("P", "a", "md", "x").await.unwrap();
        storage.write_text("P/assets", "a", "png", "x").await.unwrap();

        let names: Vec<_> = storage
            .list("P")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.md".to_string()]);
        assert_eq!(
            storage.find_by_stem("P/assets", "a").await.unwrap().as_deref(),
            Some("a.png")
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let storage = InMemoryExportStorage::new();
        let result = storage.delete("P", "a.md").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }
}
