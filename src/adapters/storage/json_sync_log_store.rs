//! JSON Sync Log Store Adapter
//!
//! Persists the sync log as a pretty-printed JSON document on disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::sync::SyncLog;
use crate::ports::{SyncLogError, SyncLogStore};

/// Default file name of the sync log inside the output directory.
pub const SYNC_LOG_FILE_NAME: &str = "sync_log.json";

/// File-based storage for the sync log
#[derive(Debug, Clone)]
pub struct JsonSyncLogStore {
    path: PathBuf,
}

impl JsonSyncLogStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for `sync_log.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SYNC_LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SYNC_LOG_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SyncLogStore for JsonSyncLogStore {
    async fn load(&self) -> Result<SyncLog, SyncLogError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SyncLog::new()),
            Err(e) => return Err(e.into()),
        };

        SyncLog::from_json(&content)
            .map_err(|e| SyncLogError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, log: &SyncLog) -> Result<(), SyncLogError> {
        let json = log
            .to_json()
            .map_err(|e| SyncLogError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}
