//! Local Filesystem Storage Adapter - Implementation of ExportStorage.
//!
//! Writes exported documents and assets below a root directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    file_name_with_extension, validate_folder, validate_segment, ByteStream, ExportStorage,
    FileInfo, FilePath, StorageError,
};

const TEMP_SUFFIX: &str = ".tmp";

/// Local filesystem storage for exported output.
///
/// # Atomic Writes
///
/// Every write goes to a uniquely named hidden temp file in the target
/// folder, is synced to disk and then renamed over the final name. A failed
/// write removes its temp file, so readers never observe partial content.
#[derive(Debug, Clone)]
pub struct LocalExportStorage {
    root: PathBuf,
}

impl LocalExportStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, folder: &str) -> Result<PathBuf, StorageError> {
        validate_folder(folder)?;
        Ok(folder
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    fn file_path(&self, folder: &str, file_name: &str) -> Result<PathBuf, StorageError> {
        validate_segment(file_name)?;
        Ok(self.folder_path(folder)?.join(file_name))
    }

    fn temp_path(dir: &Path, file_name: &str) -> PathBuf {
        dir.join(format!(".{}.{}{}", file_name, Uuid::new_v4().simple(), TEMP_SUFFIX))
    }

    async fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(dir).await.map_err(|e| {
            StorageError::io(format!("Failed to create directory {}: {}", dir.display(), e))
        })
    }

    /// Writes `body` to `temp_path` and renames it to `final_path`.
    async fn commit<S>(temp_path: &Path, final_path: &Path, mut body: S) -> Result<(), StorageError>
    where
        S: futures::Stream<Item = std::io::Result<bytes::Bytes>> + Unpin + Send,
    {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                StorageError::io(format!("Failed to read body for {}: {}", final_path.display(), e))
            })?;
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::io(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        file.sync_all().await.map_err(|e| {
            StorageError::io(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(temp_path, final_path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })
    }

    async fn write_atomically<S>(&self, dir: PathBuf, file_name: &str, body: S) -> Result<FilePath, StorageError>
    where
        S: futures::Stream<Item = std::io::Result<bytes::Bytes>> + Unpin + Send,
    {
        Self::ensure_dir(&dir).await?;
        let final_path = dir.join(file_name);
        let temp_path = Self::temp_path(&dir, file_name);

        if let Err(e) = Self::commit(&temp_path, &final_path, body).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove temp file {}: {}", temp_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        Ok(FilePath::new(final_path))
    }

    fn system_time_to_timestamp(system_time: SystemTime) -> Timestamp {
        let datetime: DateTime<Utc> = system_time.into();
        Timestamp::from_datetime(datetime)
    }
}

#[async_trait]
impl ExportStorage for LocalExportStorage {
    async fn write_text(
        &self,
        folder: &str,
        name: &str,
        extension: &str,
        content: &str,
    ) -> Result<FilePath, StorageError> {
        let file_name = file_name_with_extension(name, extension);
        validate_segment(&file_name)?;
        let dir = self.folder_path(folder)?;
        let body = futures::stream::iter(vec![Ok::<_, std::io::Error>(
            bytes::Bytes::copy_from_slice(content.as_bytes()),
        )]);
        self.write_atomically(dir, &file_name, body).await
    }

    async fn write_stream(
        &self,
        folder: &str,
        file_name: &str,
        body: ByteStream,
    ) -> Result<FilePath, StorageError> {
        validate_segment(file_name)?;
        let dir = self.folder_path(folder)?;
        self.write_atomically(dir, file_name, body).await
    }

    async fn exists(&self, folder: &str, file_name: &str) -> Result<bool, StorageError> {
        let path = self.file_path(folder, file_name)?;
        fs::try_exists(&path).await.map_err(|e| {
            StorageError::io(format!("Failed to check {}: {}", path.display(), e))
        })
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
        let dir = self.folder_path(folder)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::io(format!(
                    "Failed to read directory {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified_at = metadata
                .modified()
                .map(Self::system_time_to_timestamp)
                .unwrap_or_else(|_| Timestamp::now());
            files.push(FileInfo {
                name,
                path: FilePath::new(entry.path()),
                size_bytes: metadata.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn delete(&self, folder: &str, file_name: &str) -> Result<(), StorageError> {
        let path = self.file_path(folder, file_name)?;
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::not_found(path.display().to_string()),
            _ => StorageError::io(format!("Failed to delete {}: {}", path.display(), e)),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_storage() -> (LocalExportStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalExportStorage::new(temp_dir.path());
        (storage, temp_dir)
    }

    // ───────────────────────────────────────────────────────────────
    // Writes
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn write_text_creates_folder_and_file() {
        let (storage, temp) = create_storage();

        let path = storage
            .write_text("Projects", "Launch", "md", "# Launch\n")
            .await
            .unwrap();

        assert_eq!(path.as_path(), temp.path().join("Projects").join("Launch.md"));
        let content = std::fs::read_to_string(path.as_path()).unwrap();
        assert_eq!(content, "# Launch\n");
    }

    #[tokio::test]
    async fn write_text_overwrites_existing_file() {
        let (storage, _temp) = create_storage();
        storage.write_text("P", "a", "md", "old").await.unwrap();
        let path = storage.write_text("P", "a", "md", "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(path.as_path()).unwrap(), "new");
    }

    #[tokio::test]
    async fn write_leaves_no_temp_files() {
        let (storage, temp) = create_storage();
        storage.write_text("P", "a", "md", "x").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(temp.path().join("P"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md".to_string()]);
    }

    #[tokio::test]
    async fn write_stream_concatenates_chunks() {
        let (storage, _temp) = create_storage();
        let body: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(bytes::Bytes::from_static(b"ab")),
            Ok(bytes::Bytes::from_static(b"cd")),
        ]));

        let path = storage
            .write_stream("P/assets", "img.png", body)
            .await
            .unwrap();
        assert_eq!(std::fs::read(path.as_path()).unwrap(), b"abcd");
    }

    #[tokio::test]
    async fn failed_stream_leaves_nothing_behind() {
        let (storage, temp) = create_storage();
        let body: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(bytes::Bytes::from_static(b"ab")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]));

        let result = storage.write_stream("P", "img.png", body).await;

        assert!(result.is_err());
        let leftovers = std::fs::read_dir(temp.path().join("P")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (storage, _temp) = create_storage();
        let result = storage.write_text("../outside", "a", "md", "x").await;
        assert!(matches!(result, Err(StorageError::InvalidName { .. })));
        let result = storage.write_text("P", "..", "", "x").await;
        assert!(matches!(result, Err(StorageError::InvalidName { .. })));
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn exists_and_find_by_stem() {
        let (storage, _temp) = create_storage();
        storage.write_text("P/assets", "Launch 1", "png", "x").await.unwrap();

        assert!(storage.exists("P/assets", "Launch 1.png").await.unwrap());
        assert!(!storage.exists("P/assets", "Launch 2.png").await.unwrap());
        assert_eq!(
            storage.find_by_stem("P/assets", "Launch 1").await.unwrap(),
            Some("Launch 1.png".to_string())
        );
        assert_eq!(storage.find_by_stem("P/assets", "Launch").await.unwrap(), None);
        assert_eq!(storage.find_by_stem("missing", "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_returns_files_sorted_and_skips_dirs() {
        let (storage, _temp) = create_storage();
        storage.write_text("P", "b", "md", "bb").await.unwrap();
        storage.write_text("P", "a", "md", "a").await.unwrap();
        storage.write_text("P/assets", "img", "png", "x").await.unwrap();

        let files = storage.list("P").await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        assert_eq!(files[1].size_bytes, 2);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (storage, _temp) = create_storage();
        storage.write_text("P", "a", "md", "x").await.unwrap();

        storage.delete("P", "a.md").await.unwrap();

        assert!(!storage.exists("P", "a.md").await.unwrap());
        let again = storage.delete("P", "a.md").await;
        assert!(matches!(again, Err(StorageError::NotFound { .. })));
    }
}
