//! Sync Log Store Port - Persistence of the export ledger.

use async_trait::async_trait;

use crate::domain::sync::SyncLog;

/// Port for loading and saving the sync log.
///
/// # Contract
///
/// - `load` returns an empty log when nothing was saved yet.
/// - `load` returns `SyncLogError::Corrupt` for unreadable content so that
///   callers can fall back to a fresh log.
/// - `save` replaces the stored log atomically. Saving the same log twice
///   produces identical stored content.
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    async fn load(&self) -> Result<SyncLog, SyncLogError>;

    async fn save(&self, log: &SyncLog) -> Result<(), SyncLogError>;
}

/// Errors from sync log persistence.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncLogError {
    #[error("Sync log I/O failed: {0}")]
    Io(String),

    #[error("Sync log is corrupt: {0}")]
    Corrupt(String),

    #[error("Sync log serialization failed: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SyncLogError {
    fn from(err: std::io::Error) -> Self {
        SyncLogError::Io(err.to_string())
    }
}
