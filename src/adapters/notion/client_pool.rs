//! Content Client Pool - Spreads content API calls across several clients.
//!
//! Each client usually carries its own API key, so the pool multiplies the
//! per-key rate allowance. A call is dispatched to an idle client when one
//! exists and otherwise to the next client in round-robin order.
//!
//! # Example
//!
//! ```ignore
//! let clients: Vec<Arc<dyn ContentApi>> = keys
//!     .into_iter()
//!     .map(|key| Ok(Arc::new(NotionHttpClient::new(NotionClientConfig::new(key))?) as _))
//!     .collect::<Result<_, ContentApiError>>()?;
//!
//! let pool = ContentClientPool::new(clients);
//! ```
//!
//! Failures are logged and returned unchanged; the pool never retries.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::domain::content::{ContentBlock, PageMetadata, SourceMetadata};
use crate::domain::foundation::{BlockId, PageId, SourceId};
use crate::ports::{ContentApi, ContentApiError, SourceQuery};

struct Slot {
    client: Arc<dyn ContentApi>,
    active: AtomicUsize,
    requests: AtomicU64,
}

/// Pool of interchangeable content API clients.
pub struct ContentClientPool {
    slots: Vec<Slot>,
    cursor: AtomicUsize,
}

/// A client checked out of the pool. Released on drop.
pub struct PoolLease<'p> {
    slot: &'p Slot,
    index: usize,
}

impl<'p> PoolLease<'p> {
    pub fn client(&self) -> &dyn ContentApi {
        self.slot.client.as_ref()
    }

    /// Position of the leased client in the pool.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for PoolLease<'_> {
    fn drop(&mut self) {
        self.slot.active.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ContentClientPool {
    pub fn new(clients: Vec<Arc<dyn ContentApi>>) -> Self {
        let slots = clients
            .into_iter()
            .map(|client| Slot {
                client,
                active: AtomicUsize::new(0),
                requests: AtomicU64::new(0),
            })
            .collect();

        Self {
            slots,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn client_count(&self) -> usize {
        self.slots.len()
    }

    /// Total calls dispatched through the pool.
    pub fn request_count(&self) -> u64 {
        self.slots
            .iter()
            .map(|slot| slot.requests.load(Ordering::Relaxed))
            .sum()
    }

    /// Calls dispatched to each client, in pool order.
    pub fn requests_per_client(&self) -> Vec<u64> {
        self.slots
            .iter()
            .map(|slot| slot.requests.load(Ordering::Relaxed))
            .collect()
    }

    /// Checks out a client: the first idle one, or the next in rotation.
    pub fn acquire(&self) -> Result<PoolLease<'_>, ContentApiError> {
        if self.slots.is_empty() {
            return Err(ContentApiError::Configuration(
                "content client pool has no clients".to_string(),
            ));
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len();

        for offset in 0..self.slots.len() {
            let index = (start + offset) % self.slots.len();
            let slot = &self.slots[index];
            if slot
                .active
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(PoolLease { slot, index });
            }
        }

        let slot = &self.slots[start];
        slot.active.fetch_add(1, Ordering::AcqRel);
        Ok(PoolLease { slot, index: start })
    }

    fn lease(&self) -> Result<PoolLease<'_>, ContentApiError> {
        let lease = self.acquire()?;
        lease.slot.requests.fetch_add(1, Ordering::Relaxed);
        Ok(lease)
    }
}

fn log_failure<T>(
    result: Result<T, ContentApiError>,
    operation: &'static str,
    target: &dyn std::fmt::Display,
    client: usize,
) -> Result<T, ContentApiError> {
    if let Err(e) = &result {
        tracing::error!(
            operation,
            target = %target,
            client,
            transient = e.is_transient(),
            error = %e,
            "Content API call failed"
        );
    }
    result
}

#[async_trait]
impl ContentApi for ContentClientPool {
    async fn query_source(
        &self,
        source_id: &SourceId,
        query: &SourceQuery,
    ) -> Result<Vec<PageId>, ContentApiError> {
        let lease = self.lease()?;
        let result = lease.client().query_source(source_id, query).await;
        log_failure(result, "query_source", source_id, lease.index())
    }

    async fn get_source(&self, source_id: &SourceId) -> Result<SourceMetadata, ContentApiError> {
        let lease = self.lease()?;
        let result = lease.client().get_source(source_id).await;
        log_failure(result, "get_source", source_id, lease.index())
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageMetadata, ContentApiError> {
        let lease = self.lease()?;
        let result = lease.client().get_page(page_id).await;
        log_failure(result, "get_page", page_id, lease.index())
    }

    async fn get_block_children(
        &self,
        block_id: &BlockId,
    ) -> Result<Vec<ContentBlock>, ContentApiError> {
        let lease = self.lease()?;
        let result = lease.client().get_block_children(block_id).await;
        log_failure(result, "get_block_children", block_id, lease.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notion::InMemoryContentApi;

    fn pool_of(n: usize) -> (ContentClientPool, Vec<InMemoryContentApi>) {
        let apis: Vec<InMemoryContentApi> = (0..n).map(|_| InMemoryContentApi::new()).collect();
        let clients = apis
            .iter()
            .map(|api| Arc::new(api.clone()) as Arc<dyn ContentApi>)
            .collect();
        (ContentClientPool::new(clients), apis)
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Selection
    // ════════════════════════════════════════════════════════════════════════════════

    #[test]
    fn empty_pool_is_a_configuration_error() {
        let pool = ContentClientPool::new(Vec::new());
        assert!(matches!(
            pool.acquire(),
            Err(ContentApiError::Configuration(_))
        ));
    }

    #[test]
    fn idle_clients_are_preferred() {
        let (pool, _) = pool_of(3);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();

        let mut indices = vec![a.index(), b.index(), c.index()];
        indices.sort();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn busy_pool_rotates() {
        let (pool, _) = pool_of(2);
        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();

        let c = pool.acquire().unwrap();
        let d = pool.acquire().unwrap();
        assert_ne!(c.index(), d.index());
    }

    #[test]
    fn released_client_becomes_idle_again() {
        let (pool, _) = pool_of(2);
        let held = pool.acquire().unwrap();
        let held_index = held.index();
        {
            let other = pool.acquire().unwrap();
            assert_ne!(other.index(), held_index);
        }
        let again = pool.acquire().unwrap();
        assert_ne!(again.index(), held_index);
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Dispatch
    // ════════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn sequential_calls_spread_across_clients() {
        let (pool, apis) = pool_of(2);
        let page = apis[0].add_page("Launch");
        apis[1].insert_page(apis[0].page(&page).unwrap());

        for _ in 0..4 {
            pool.get_page(&page).await.unwrap();
        }

        assert_eq!(pool.request_count(), 4);
        assert_eq!(pool.requests_per_client(), vec![2, 2]);
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let (pool, _) = pool_of(1);
        let result = pool.get_page(&PageId::new()).await;

        assert!(matches!(result, Err(ContentApiError::NotFound(_))));
        assert_eq!(pool.request_count(), 1);
    }

    #[test]
    fn pool_is_a_content_api() {
        fn check<T: ContentApi>() {}
        check::<ContentClientPool>();
    }
}
