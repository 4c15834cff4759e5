//! In-Memory Sync Log Store Adapter
//!
//! Holds the serialized sync log in memory. Useful for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::sync::SyncLog;
use crate::ports::{SyncLogError, SyncLogStore};

/// In-memory storage for the sync log
#[derive(Debug, Clone, Default)]
pub struct InMemorySyncLogStore {
    content: Arc<RwLock<Option<String>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemorySyncLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding raw serialized content, valid or not
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Arc::new(RwLock::new(Some(content.into()))),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The last saved serialized content
    pub async fn content(&self) -> Option<String> {
        self.content.read().await.clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncLogStore for InMemorySyncLogStore {
    async fn load(&self) -> Result<SyncLog, SyncLogError> {
        match self.content.read().await.as_deref() {
            None => Ok(SyncLog::new()),
            Some(content) => {
                SyncLog::from_json(content).map_err(|e| SyncLogError::Corrupt(e.to_string()))
            }
        }
    }

    async fn save(&self, log: &SyncLog) -> Result<(), SyncLogError> {
        let json = log
            .to_json()
            .map_err(|e| SyncLogError::Serialization(e.to_string()))?;
        *self.content.write().await = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
