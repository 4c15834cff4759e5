//! SyncLedger - Shared, lock-guarded access to the sync log.
//!
//! Pages of every source are exported concurrently and all of them update
//! the same log. The ledger funnels every read, mutation and save through
//! one async mutex, so a save always writes a consistent snapshot and saves
//! never interleave.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::content::{PageMetadata, SourceMetadata};
use crate::domain::foundation::{PageId, SourceId, Timestamp};
use crate::domain::sync::{SyncLog, SyncRecord};
use crate::ports::{ExportStorage, StorageError, SyncLogError, SyncLogStore};

/// Sync log service used by the export handlers.
pub struct SyncLedger {
    log: Mutex<SyncLog>,
    store: Arc<dyn SyncLogStore>,
    storage: Arc<dyn ExportStorage>,
}

impl SyncLedger {
    /// Loads the persisted log. Unreadable content starts a fresh log.
    pub async fn load(
        store: Arc<dyn SyncLogStore>,
        storage: Arc<dyn ExportStorage>,
    ) -> Result<Self, SyncLogError> {
        let log = match store.load().await {
            Ok(log) => log,
            Err(SyncLogError::Corrupt(reason)) => {
                tracing::warn!(%reason, "Sync log is corrupt, starting with an empty log");
                SyncLog::new()
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(records = log.len(), "Loaded sync log");
        Ok(Self {
            log: Mutex::new(log),
            store,
            storage,
        })
    }

    /// True when the page's output file is missing, it was never exported,
    /// or it was edited after its last export.
    pub async fn is_stale(
        &self,
        source_id: &SourceId,
        page: &PageMetadata,
        folder: &str,
        file_name: &str,
    ) -> Result<bool, StorageError> {
        let logged_stale = self
            .log
            .lock()
            .await
            .is_stale(source_id, &page.id, &page.last_edited_time);
        if logged_stale {
            return Ok(true);
        }
        Ok(!self.storage.exists(folder, file_name).await?)
    }

    /// Records an export of `page` at the current time and persists the log.
    pub async fn record(
        &self,
        source: &SourceMetadata,
        page: &PageMetadata,
    ) -> Result<Timestamp, SyncLogError> {
        let mut log = self.log.lock().await;
        let exported_at = log.record(
            source.id,
            &source.title,
            page.id,
            &page.title,
            page.last_edited_time,
            Timestamp::now(),
        );
        self.store.save(&log).await?;
        Ok(exported_at)
    }

    /// Records of every page exported from a source.
    pub async fn records(&self, source_id: &SourceId) -> Vec<(PageId, SyncRecord)> {
        self.log
            .lock()
            .await
            .source(source_id)
            .map(|source| {
                source
                    .items
                    .iter()
                    .map(|(id, record)| (*id, record.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes the given pages' records and persists the log.
    pub async fn forget(&self, source_id: &SourceId, page_ids: &[PageId]) -> Result<(), SyncLogError> {
        if page_ids.is_empty() {
            return Ok(());
        }
        let mut log = self.log.lock().await;
        for page_id in page_ids {
            log.remove(source_id, page_id);
        }
        self.store.save(&log).await
    }

    /// Persists the current log.
    pub async fn persist(&self) -> Result<(), SyncLogError> {
        let log = self.log.lock().await;
        self.store.save(&log).await
    }

    /// Copy of the current log.
    pub async fn snapshot(&self) -> SyncLog {
        self.log.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{InMemoryExportStorage, InMemorySyncLogStore};
    use crate::domain::content::ParentRef;

    fn source() -> SourceMetadata {
        SourceMetadata {
            id: SourceId::new(),
            title: "Projects".into(),
        }
    }

    fn page(source: &SourceMetadata, edited: Timestamp) -> PageMetadata {
        PageMetadata {
            id: PageId::new(),
            title: "Launch".into(),
            last_edited_time: edited,
            parent: ParentRef::Source(source.id),
        }
    }

    async fn ledger_with(
        store: InMemorySyncLogStore,
    ) -> (SyncLedger, InMemorySyncLogStore, InMemoryExportStorage) {
        let storage = InMemoryExportStorage::new();
        let ledger = SyncLedger::load(Arc::new(store.clone()), Arc::new(storage.clone()))
            .await
            .unwrap();
        (ledger, store, storage)
    }

    #[tokio::test]
    async fn corrupt_log_starts_empty() {
        let (ledger, _, _) = ledger_with(InMemorySyncLogStore::with_content("{not json")).await;
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn unexported_page_is_stale() {
        let (ledger, _, _) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        let page = page(&source, Timestamp::now());

        assert!(ledger
            .is_stale(&source.id, &page, "Projects", "Launch.md")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn recorded_page_with_file_is_fresh() {
        let (ledger, store, storage) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        let page = page(&source, Timestamp::now().minus_secs(60));
        storage
            .write_text("Projects", "Launch", "md", "x")
            .await
            .unwrap();

        ledger.record(&source, &page).await.unwrap();

        assert!(!ledger
            .is_stale(&source.id, &page, "Projects", "Launch.md")
            .await
            .unwrap());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn missing_file_makes_recorded_page_stale() {
        let (ledger, _, _) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        let page = page(&source, Timestamp::now().minus_secs(60));

        ledger.record(&source, &page).await.unwrap();

        assert!(ledger
            .is_stale(&source.id, &page, "Projects", "Launch.md")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn edit_after_export_makes_page_stale() {
        let (ledger, _, storage) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        let mut page = page(&source, Timestamp::now().minus_secs(60));
        storage
            .write_text("Projects", "Launch", "md", "x")
            .await
            .unwrap();
        ledger.record(&source, &page).await.unwrap();

        page.last_edited_time = Timestamp::now().plus_secs(60);

        assert!(ledger
            .is_stale(&source.id, &page, "Projects", "Launch.md")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn forget_removes_records_and_persists() {
        let (ledger, store, _) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        let page = page(&source, Timestamp::now());
        ledger.record(&source, &page).await.unwrap();

        ledger.forget(&source.id, &[page.id]).await.unwrap();

        assert!(ledger.records(&source.id).await.is_empty());
        assert_eq!(store.save_count(), 2);
    }

    #[tokio::test]
    async fn persisting_twice_writes_identical_content() {
        let (ledger, store, _) = ledger_with(InMemorySyncLogStore::new()).await;
        let source = source();
        for _ in 0..3 {
            ledger.record(&source, &page(&source, Timestamp::now())).await.unwrap();
        }

        ledger.persist().await.unwrap();
        let first = store.content().await.unwrap();
        ledger.persist().await.unwrap();

        assert_eq!(store.content().await.unwrap(), first);
    }

    #[tokio::test]
    async fn concurrent_records_all_land() {
        let (ledger, store, _) = ledger_with(InMemorySyncLogStore::new()).await;
        let ledger = Arc::new(ledger);
        let source = source();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                let source = source.clone();
                tokio::spawn(async move {
                    let page = page(&source, Timestamp::now());
                    ledger.record(&source, &page).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(ledger.records(&source.id).await.len(), 16);
        let persisted = SyncLog::from_json(&store.content().await.unwrap()).unwrap();
        assert_eq!(persisted.len(), 16);
    }
}
