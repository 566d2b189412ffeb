//! Shared test helpers: a programmable fake origin and manager builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use breathbox::cache::manager::CacheManager;
use breathbox::cache::network::{Origin, OriginResponse, ResponseKind};
use breathbox::cache::storage::MemoryCache;
use breathbox::error::CacheError;

pub const VERSION: &str = "breathbox-cache-v1";

pub const SHELL_PATHS: [&str; 4] = [
    "/",
    "/manifest.json",
    "/icon-192x192.svg",
    "/icon-512x512.svg",
];

/// Programmable origin: path → canned response, with an offline switch
/// and call counters.
pub struct FakeOrigin {
    responses: Mutex<HashMap<String, OriginResponse>>,
    offline: AtomicBool,
    fetch_calls: AtomicUsize,
    forward_calls: AtomicUsize,
}

impl FakeOrigin {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
            forward_calls: AtomicUsize::new(0),
        }
    }

    /// An origin seeded with the default app shell.
    pub fn with_shell() -> Self {
        let origin = Self::new();
        for path in SHELL_PATHS {
            origin.insert(path, page(&format!("asset:{path}")));
        }
        origin
    }

    pub fn insert(&self, path: &str, response: OriginResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn forward_count(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, path: &str) -> Result<OriginResponse, CacheError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Network {
                path: path.to_string(),
                message: "simulated offline".to_string(),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(OriginResponse {
                status: 404,
                content_type: None,
                body: Bytes::new(),
                kind: ResponseKind::Basic,
            }))
    }
}

#[async_trait]
impl Origin for FakeOrigin {
    async fn fetch(&self, path: &str) -> Result<OriginResponse, CacheError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(path)
    }

    async fn forward(
        &self,
        method: &str,
        path: &str,
        _body: Bytes,
    ) -> Result<OriginResponse, CacheError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Network {
                path: path.to_string(),
                message: "simulated offline".to_string(),
            });
        }
        Ok(page(&format!("forwarded:{method} {path}")))
    }
}

/// A 200 same-origin HTML response.
pub fn page(body: &str) -> OriginResponse {
    OriginResponse {
        status: 200,
        content_type: Some("text/html".to_string()),
        body: Bytes::from(body.to_string()),
        kind: ResponseKind::Basic,
    }
}

/// A manager over the given origin with the default shell manifest,
/// not yet installed.
pub fn manager_with(
    origin: Arc<FakeOrigin>,
    backend: Arc<MemoryCache>,
) -> Arc<CacheManager> {
    Arc::new(CacheManager::new(
        VERSION,
        SHELL_PATHS.iter().map(ToString::to_string).collect(),
        "/",
        backend,
        origin,
    ))
}

/// A fully installed and activated manager over a shell-seeded fake
/// origin. Returns the collaborators for inspection.
pub async fn active_manager() -> (Arc<CacheManager>, Arc<MemoryCache>, Arc<FakeOrigin>) {
    let origin = Arc::new(FakeOrigin::with_shell());
    let backend = Arc::new(MemoryCache::new());
    let manager = manager_with(Arc::clone(&origin), Arc::clone(&backend));
    manager.install().await.expect("install");
    manager.activate().await.expect("activate");
    (manager, backend, origin)
}
