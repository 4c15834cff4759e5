//! Per-page record of block types that were not rendered.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::content::BlockType;
use crate::domain::foundation::PageId;

/// Omitted block types seen on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageWarnings {
    pub page_title: String,
    pub omitted: BTreeSet<BlockType>,
}

/// Omitted block types keyed by page. Each page and type pair is recorded
/// once no matter how often it occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningLog {
    pages: BTreeMap<PageId, PageWarnings>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `block_type` was omitted on a page. Returns true the first
    /// time the pair is seen.
    pub fn record(&mut self, page_id: PageId, page_title: &str, block_type: BlockType) -> bool {
        let entry = self.pages.entry(page_id).or_insert_with(|| PageWarnings {
            page_title: page_title.to_string(),
            omitted: BTreeSet::new(),
        });
        entry.omitted.insert(block_type)
    }

    /// Moves every entry of `other` into this log.
    pub fn merge(&mut self, other: WarningLog) {
        for (page_id, warnings) in other.pages {
            let entry = self.pages.entry(page_id).or_insert_with(|| PageWarnings {
                page_title: warnings.page_title.clone(),
                omitted: BTreeSet::new(),
            });
            entry.omitted.extend(warnings.omitted);
        }
    }

    pub fn get(&self, page_id: &PageId) -> Option<&PageWarnings> {
        self.pages.get(page_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &PageWarnings)> {
        self.pages.iter()
    }

    /// Total number of page and type pairs.
    pub fn len(&self) -> usize {
        self.pages.values().map(|w| w.omitted.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_type_is_recorded_once() {
        let mut log = WarningLog::new();
        let page = PageId::new();
        assert!(log.record(page, "Launch", BlockType::Breadcrumb));
        assert!(!log.record(page, "Launch", BlockType::Breadcrumb));
        assert!(log.record(page, "Launch", BlockType::Column));
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&page).unwrap().page_title, "Launch");
    }

    #[test]
    fn merge_unions_types_per_page() {
        let page = PageId::new();
        let mut a = WarningLog::new();
        a.record(page, "Launch", BlockType::Breadcrumb);
        let mut b = WarningLog::new();
        b.record(page, "Launch", BlockType::Breadcrumb);
        b.record(PageId::new(), "Other", BlockType::ChildPage);

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.iter().count(), 2);
    }
}
