//! Offline asset cache: versioned stores, origin access, and the
//! install/activate/fetch lifecycle.

pub mod manager;
pub mod network;
pub mod storage;

pub use manager::{AssetRequest, CacheManager, FetchOutcome, Lifecycle, ServedFrom};
pub use network::{HttpOrigin, Origin, OriginResponse, ResponseKind};
pub use storage::{CacheBackend, CachedAsset, MemoryCache};
