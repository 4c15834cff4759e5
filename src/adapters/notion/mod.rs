//! Content service adapters.
//!
//! - `NotionHttpClient` - One API key against the REST API
//! - `ContentClientPool` - Spreads calls over several clients
//! - `InMemoryContentApi` - Test double

mod client_pool;
mod http_client;
mod in_memory_content_api;
mod wire;

pub use client_pool::{ContentClientPool, PoolLease};
pub use http_client::{NotionClientConfig, NotionHttpClient, DEFAULT_API_VERSION, MAX_PAGE_SIZE};
pub use in_memory_content_api::InMemoryContentApi;
