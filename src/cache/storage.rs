//! Versioned asset stores.
//!
//! A backend holds any number of named stores, each mapping a request
//! path to a cached response. Exactly one store name matches the active
//! cache version at a time; the rest are stale and get collected at
//! activation.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::CacheError;

/// A response held by (or destined for) an asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    /// HTTP status the asset was stored with.
    pub status: u16,
    /// Content type header, when the origin provided one.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl CachedAsset {
    /// Convenience constructor for a 200 response.
    #[must_use]
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }
}

/// Storage contract for named, versioned asset stores.
///
/// Implementations must tolerate concurrent reads and writes; the
/// manager never wraps backend calls in its own locking.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Looks up a cached response for `path` in the named store.
    async fn get(&self, store: &str, path: &str) -> Result<Option<CachedAsset>, CacheError>;

    /// Inserts (or replaces) a cached response in the named store,
    /// creating the store if needed.
    async fn put(&self, store: &str, path: &str, asset: CachedAsset) -> Result<(), CacheError>;

    /// Names of every store currently present.
    async fn store_names(&self) -> Result<Vec<String>, CacheError>;

    /// Deletes an entire store. Returns whether it existed.
    async fn remove_store(&self, store: &str) -> Result<bool, CacheError>;
}

// ============================================================================
// MemoryCache
// ============================================================================

/// In-memory backend over concurrent maps.
#[derive(Debug, Default)]
pub struct MemoryCache {
    stores: DashMap<String, DashMap<String, CachedAsset>>,
}

impl MemoryCache {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, store: &str, path: &str) -> Result<Option<CachedAsset>, CacheError> {
        Ok(self
            .stores
            .get(store)
            .and_then(|entries| entries.get(path).map(|entry| entry.value().clone())))
    }

    async fn put(&self, store: &str, path: &str, asset: CachedAsset) -> Result<(), CacheError> {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(path.to_string(), asset);
        Ok(())
    }

    async fn store_names(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.stores.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn remove_store(&self, store: &str) -> Result<bool, CacheError> {
        Ok(self.stores.remove(store).is_some())
    }
}

// ============================================================================
// Tests
// ============================================================================
