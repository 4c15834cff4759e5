//! Export Storage Port - Filesystem operations for exported documents.
//!
//! Output is organized in folders relative to a storage root:
//!
//! ```text
//! {root}/{source folder}/{page}.md
//! {root}/{source folder}/assets/{owner}.{ext}
//! ```
//!
//! Folders may contain `/`-separated segments. Neither folders nor file names
//! may escape the root.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Body of a streamed write.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Port for writing exported documents and assets.
///
/// # Contract
///
/// Implementations must:
/// - Create missing folders on write
/// - Write atomically, leaving no partial file when a write fails
/// - Reject names that would escape the storage root
#[async_trait]
pub trait ExportStorage: Send + Sync {
    /// Writes `{folder}/{name}.{extension}` and returns its path.
    async fn write_text(
        &self,
        folder: &str,
        name: &str,
        extension: &str,
        content: &str,
    ) -> Result<FilePath, StorageError>;

    /// Streams `body` into `{folder}/{file_name}`. The file only appears once
    /// the whole body has been written.
    async fn write_stream(
        &self,
        folder: &str,
        file_name: &str,
        body: ByteStream,
    ) -> Result<FilePath, StorageError>;

    /// Checks whether `{folder}/{file_name}` exists.
    async fn exists(&self, folder: &str, file_name: &str) -> Result<bool, StorageError>;

    /// Finds a file in `folder` whose name without extension equals `stem`.
    ///
    /// Returns the full file name, or `None` when there is no such file or the
    /// folder does not exist.
    async fn find_by_stem(&self, folder: &str, stem: &str) -> Result<Option<String>, StorageError>;

    /// Lists the files directly inside `folder`. A missing folder is empty.
    async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, StorageError>;

    /// Deletes `{folder}/{file_name}`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file doesn't exist.
    async fn delete(&self, folder: &str, file_name: &str) -> Result<(), StorageError>;
}

/// Checks that a single path segment stays inside its folder.
pub fn validate_segment(segment: &str) -> Result<(), StorageError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(StorageError::invalid_name(segment));
    }
    Ok(())
}

/// Checks every segment of a relative folder. An empty folder is the root.
pub fn validate_folder(folder: &str) -> Result<(), StorageError> {
    if folder.is_empty() {
        return Ok(());
    }
    if folder.starts_with('/') {
        return Err(StorageError::invalid_name(folder));
    }
    folder.split('/').try_for_each(validate_segment)
}

/// Joins a file name and extension. An empty extension adds no dot.
pub fn file_name_with_extension(name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

/// Represents a file path (absolute or relative).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePath(PathBuf);

impl FilePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string (lossy conversion for non-UTF8 paths).
    pub fn to_string_lossy(&self) -> String {
        self.0.to_string_lossy().to_string()
    }

    pub fn as_path(&self) -> &std::path::Path {
        &self.0
    }

    /// Returns the file name without the directory.
    pub fn file_name(&self) -> Option<String> {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl From<PathBuf> for FilePath {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self::new(PathBuf::from(s))
    }
}

/// Information about a stored file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// File name including extension.
    pub name: String,
    pub path: FilePath,
    pub size_bytes: u64,
    pub modified_at: Timestamp,
}

impl FileInfo {
    /// File name without its last extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(0) | None => &self.name,
            Some(pos) => &self.name[..pos],
        }
    }
}

/// Errors that can occur during export storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("IO error: {message}")]
    Io { message: String },

    /// A folder or file name would escape the storage root.
    #[error("Invalid file name: {name}")]
    InvalidName { name: String },
}

impl StorageError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::not_found(err.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StorageError::permission_denied(err.to_string())
            }
            _ => StorageError::io(err.to_string()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
