//! Sync log: when each page was last exported.
//!
//! The log is a pure value. Locking and persistence live in the application
//! layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{PageId, SourceId, Timestamp};

/// Export record of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub title: String,
    /// Last-edited time reported by the content service at export time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<Timestamp>,
    pub last_exported_time: Timestamp,
}

/// Export records of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSyncLog {
    pub title: String,
    #[serde(default)]
    pub items: BTreeMap<PageId, SyncRecord>,
}

/// Export records keyed by source, then page. Ordered maps keep the
/// serialized form stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncLog {
    sources: BTreeMap<SourceId, SourceSyncLog>,
}

impl SyncLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a serialized log. Blank input is an empty log.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content)
    }

    /// Serializes the log as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// True when the page has no export record or was edited after its last
    /// export. Output file presence is checked by the caller.
    pub fn is_stale(&self, source_id: &SourceId, page_id: &PageId, last_edited: &Timestamp) -> bool {
        match self.record_for(source_id, page_id) {
            None => true,
            Some(record) => last_edited.is_after(&record.last_exported_time),
        }
    }

    /// Records an export of the page at `now`. The stored export time never
    /// moves backwards.
    pub fn record(
        &mut self,
        source_id: SourceId,
        source_title: &str,
        page_id: PageId,
        page_title: &str,
        last_edited: Timestamp,
        now: Timestamp,
    ) -> Timestamp {
        let source = self.sources.entry(source_id).or_default();
        source.title = source_title.to_string();

        let exported = match source.items.get(&page_id) {
            Some(existing) if existing.last_exported_time.is_after(&now) => {
                existing.last_exported_time
            }
            _ => now,
        };

        source.items.insert(
            page_id,
            SyncRecord {
                title: page_title.to_string(),
                last_edited_time: Some(last_edited),
                last_exported_time: exported,
            },
        );
        exported
    }

    pub fn record_for(&self, source_id: &SourceId, page_id: &PageId) -> Option<&SyncRecord> {
        self.sources.get(source_id)?.items.get(page_id)
    }

    pub fn source(&self, source_id: &SourceId) -> Option<&SourceSyncLog> {
        self.sources.get(source_id)
    }

    /// Removes a page's record.
    pub fn remove(&mut self, source_id: &SourceId, page_id: &PageId) -> Option<SyncRecord> {
        self.sources.get_mut(source_id)?.items.remove(page_id)
    }

    /// Number of page records across all sources.
    pub fn len(&self) -> usize {
        self.sources.values().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
