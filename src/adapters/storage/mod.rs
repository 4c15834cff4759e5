//! Storage adapters for exported output and the sync log.

mod in_memory_export_storage;
mod in_memory_sync_log_store;
mod json_sync_log_store;
mod local_export_storage;

pub use in_memory_export_storage::InMemoryExportStorage;
pub use in_memory_sync_log_store::InMemorySyncLogStore;
pub use json_sync_log_store::{JsonSyncLogStore, SYNC_LOG_FILE_NAME};
pub use local_export_storage::LocalExportStorage;
