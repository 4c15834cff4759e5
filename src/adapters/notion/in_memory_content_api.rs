//! In-memory content API for testing.
//!
//! Holds sources, pages and block trees built through helper methods and
//! counts every call per operation.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. This adapter is for tests
//! and should NOT be used in production.
//!
//! # Example
//!
//! ```ignore
//! let api = InMemoryContentApi::new();
//! let source = api.add_source("Projects");
//! let page = api.add_page_to(&source, "Launch", Timestamp::now());
//! api.append_child(page, BlockKind::Paragraph { text: vec![RichTextSpan::text("Hi")] });
//!
//! assert_eq!(api.call_count("get_block_children"), 0);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::content::{
    BlockKind, ContentBlock, PageMetadata, ParentRef, SourceMetadata,
};
use crate::domain::foundation::{BlockId, PageId, SourceId, Timestamp};
use crate::ports::{ContentApi, ContentApiError, SourceQuery};

#[derive(Debug, Default)]
struct State {
    sources: HashMap<SourceId, (SourceMetadata, Vec<PageId>)>,
    pages: HashMap<PageId, PageMetadata>,
    blocks: HashMap<BlockId, ContentBlock>,
    children: HashMap<BlockId, Vec<BlockId>>,
    failures: HashMap<String, ContentApiError>,
    calls: HashMap<&'static str, usize>,
}

/// Content service double. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentApi {
    state: Arc<RwLock<State>>,
}

impl InMemoryContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().expect("content api lock poisoned")
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().expect("content api lock poisoned")
    }

    // === Builders ===

    pub fn add_source(&self, title: &str) -> SourceId {
        let id = SourceId::new();
        let metadata = SourceMetadata {
            id,
            title: title.to_string(),
        };
        self.write().sources.insert(id, (metadata, Vec::new()));
        id
    }

    /// Adds a page that belongs to no source.
    pub fn add_page(&self, title: &str) -> PageId {
        let id = PageId::new();
        self.insert_page(PageMetadata {
            id,
            title: title.to_string(),
            last_edited_time: Timestamp::now(),
            parent: ParentRef::Workspace,
        });
        id
    }

    /// Adds a page at the end of a source's query results.
    pub fn add_page_to(&self, source: &SourceId, title: &str, last_edited: Timestamp) -> PageId {
        let id = PageId::new();
        self.insert_page(PageMetadata {
            id,
            title: title.to_string(),
            last_edited_time: last_edited,
            parent: ParentRef::Source(*source),
        });
        if let Some((_, pages)) = self.write().sources.get_mut(source) {
            pages.push(id);
        }
        id
    }

    pub fn insert_page(&self, page: PageMetadata) {
        self.write().pages.insert(page.id, page);
    }

    pub fn page(&self, id: &PageId) -> Option<PageMetadata> {
        self.read().pages.get(id).cloned()
    }

    /// Moves a page's edit time forward.
    pub fn touch_page(&self, id: &PageId, last_edited: Timestamp) {
        if let Some(page) = self.write().pages.get_mut(id) {
            page.last_edited_time = last_edited;
        }
    }

    /// Removes a page from every source listing.
    pub fn remove_page(&self, id: &PageId) {
        let mut state = self.write();
        state.pages.remove(id);
        for (_, pages) in state.sources.values_mut() {
            pages.retain(|p| p != id);
        }
    }

    /// Appends a block under `parent` (a page or a block) and returns its id.
    pub fn append_child(&self, parent: impl Into<BlockId>, kind: BlockKind) -> BlockId {
        let parent = parent.into();
        let id = BlockId::new();
        let mut state = self.write();
        state.blocks.insert(id, ContentBlock::new(id, kind));
        state.children.entry(parent).or_default().push(id);
        if let Some(block) = state.blocks.get_mut(&parent) {
            block.has_children = true;
        }
        id
    }

    /// Makes every call naming `id` fail with `error`.
    pub fn fail_on(&self, id: impl std::fmt::Display, error: ContentApiError) {
        self.write().failures.insert(id.to_string(), error);
    }

    // === Assertions ===

    /// Number of calls made to `operation`, e.g. `"get_block_children"`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.read().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.read().calls.values().sum()
    }

    fn enter(&self, operation: &'static str, id: &dyn std::fmt::Display) -> Result<(), ContentApiError> {
        let mut state = self.write();
        *state.calls.entry(operation).or_default() += 1;
        match state.failures.get(&id.to_string()) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentApi for InMemoryContentApi {
    async fn query_source(
        &self,
        source_id: &SourceId,
        _query: &SourceQuery,
    ) -> Result<Vec<PageId>, ContentApiError> {
        self.enter("query_source", source_id)?;
        self.read()
            .sources
            .get(source_id)
            .map(|(_, pages)| pages.clone())
            .ok_or_else(|| ContentApiError::NotFound(source_id.to_string()))
    }

    async fn get_source(&self, source_id: &SourceId) -> Result<SourceMetadata, ContentApiError> {
        self.enter("get_source", source_id)?;
        self.read()
            .sources
            .get(source_id)
            .map(|(metadata, _)| metadata.clone())
            .ok_or_else(|| ContentApiError::NotFound(source_id.to_string()))
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageMetadata, ContentApiError> {
        self.enter("get_page", page_id)?;
        self.page(page_id)
            .ok_or_else(|| ContentApiError::NotFound(page_id.to_string()))
    }

    async fn get_block_children(
        &self,
        block_id: &BlockId,
    ) -> Result<Vec<ContentBlock>, ContentApiError> {
        self.enter("get_block_children", block_id)?;
        let state = self.read();
        let children = state
            .children
            .get(block_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.blocks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::RichTextSpan;

    fn paragraph(text: &str) -> BlockKind {
        BlockKind::Paragraph {
            text: vec![RichTextSpan::text(text)],
        }
    }

    #[tokio::test]
    async fn source_lists_pages_in_insertion_order() {
        let api = InMemoryContentApi::new();
        let source = api.add_source("Projects");
        let first = api.add_page_to(&source, "One", Timestamp::now());
        let second = api.add_page_to(&source, "Two", Timestamp::now());

        let ids = api
            .query_source(&source, &SourceQuery::default())
            .await
            .unwrap();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(api.get_source(&source).await.unwrap().title, "Projects");
    }

    #[tokio::test]
    async fn appending_marks_parent_block_as_having_children() {
        let api = InMemoryContentApi::new();
        let page = api.add_page("Launch");
        let toggle = api.append_child(page, BlockKind::Toggle { text: vec![] });
        api.append_child(toggle, paragraph("inside"));

        let top = api.get_block_children(&page.into()).await.unwrap();
        assert_eq!(top.len(), 1);
        assert!(top[0].has_children);

        let nested = api.get_block_children(&toggle).await.unwrap();
        assert_eq!(nested.len(), 1);
        assert!(!nested[0].has_children);
    }

    #[tokio::test]
    async fn unknown_block_has_no_children() {
        let api = InMemoryContentApi::new();
        assert!(api
            .get_block_children(&BlockId::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn injected_failures_and_counts() {
        let api = InMemoryContentApi::new();
        let page = api.add_page("Broken");
        api.fail_on(page, ContentApiError::Unavailable("down".into()));

        assert!(matches!(
            api.get_page(&page).await,
            Err(ContentApiError::Unavailable(_))
        ));
        assert!(api.get_block_children(&page.into()).await.is_err());
        assert_eq!(api.call_count("get_page"), 1);
        assert_eq!(api.call_count("get_block_children"), 1);
        assert_eq!(api.total_calls(), 2);
    }

    #[tokio::test]
    async fn removed_page_leaves_source_listing() {
        let api = InMemoryContentApi::new();
        let source = api.add_source("Projects");
        let page = api.add_page_to(&source, "Gone", Timestamp::now());
        api.remove_page(&page);

        let ids = api
            .query_source(&source, &SourceQuery::default())
            .await
            .unwrap();
        assert!(ids.is_empty());
    }
}
