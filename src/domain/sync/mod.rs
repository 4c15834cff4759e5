//! Incremental export bookkeeping.

mod sync_log;

pub use sync_log::{SourceSyncLog, SyncLog, SyncRecord};
