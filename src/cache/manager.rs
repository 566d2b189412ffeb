//! Offline cache lifecycle and fetch policy.
//!
//! The manager owns one versioned store and moves through
//! `Created → Installing → Waiting → Active`:
//!
//! - **install** populates the current-version store with the precache
//!   manifest (the app shell);
//! - **activate** garbage-collects every store whose name differs from
//!   the current version, then begins servicing cache-first lookups;
//! - **fetch** answers each request: cache-first for handled GETs,
//!   network on miss with a fire-and-forget cache write, and a fallback
//!   to the cached root document when the network is down.
//!
//! Changing the version string on deploy is the sole invalidation
//! mechanism for stale stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::network::Origin;
use crate::cache::storage::{CacheBackend, CachedAsset};
use crate::error::CacheError;

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle states of the cache manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Constructed; nothing installed yet.
    Created = 0,
    /// Precache population in progress.
    Installing = 1,
    /// Installed; ready for immediate activation.
    Waiting = 2,
    /// Serving cache-first lookups.
    Active = 3,
}

impl Lifecycle {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Installing,
            2 => Self::Waiting,
            3 => Self::Active,
            _ => Self::Created,
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Active => "active",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Requests and Outcomes
// ============================================================================

/// A request as seen by the fetch policy.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    /// HTTP method, uppercase.
    pub method: String,
    /// Origin-form request path.
    pub path: String,
    /// Whether the request targets another origin.
    pub cross_origin: bool,
    /// Request body, relevant only for pass-through.
    pub body: Bytes,
}

impl AssetRequest {
    /// A same-origin GET for `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            cross_origin: false,
            body: Bytes::new(),
        }
    }

    /// Whether the caching policy applies. Everything else passes
    /// through to the network untouched and is never cached.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.method == "GET" && !self.cross_origin
    }
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Cache hit in the current-version store.
    Cache,
    /// Fetched from the origin.
    Network,
    /// Offline fallback to the cached root document.
    Fallback,
    /// Forwarded without cache involvement.
    PassThrough,
}

/// Result of a fetch decision.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The response to deliver.
    pub asset: CachedAsset,
    /// Provenance of the response.
    pub served_from: ServedFrom,
    /// Handle of the fire-and-forget cache write, when one was spawned.
    /// The write is never awaited before the response is returned; tests
    /// may await the handle to observe the stored value.
    pub background_write: Option<JoinHandle<()>>,
}

// ============================================================================
// CacheManager
// ============================================================================

/// Versioned offline cache with an install/activate/fetch lifecycle.
///
/// The version string and both collaborators are injected at
/// construction, so tests substitute fake storage and origins without
/// touching global state.
pub struct CacheManager {
    version: String,
    precache: Vec<String>,
    root_path: String,
    backend: Arc<dyn CacheBackend>,
    origin: Arc<dyn Origin>,
    state: AtomicU8,
}

impl CacheManager {
    /// Creates a manager for the given cache version.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        precache: Vec<String>,
        root_path: impl Into<String>,
        backend: Arc<dyn CacheBackend>,
        origin: Arc<dyn Origin>,
    ) -> Self {
        Self {
            version: version.into(),
            precache,
            root_path: root_path.into(),
            backend,
            origin,
            state: AtomicU8::new(Lifecycle::Created as u8),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Active cache version identifier.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    fn transition(&self, from: Lifecycle, to: Lifecycle) -> Result<(), CacheError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|actual| {
                CacheError::Lifecycle(format!(
                    "{from} → {to} requested while {}",
                    Lifecycle::from_u8(actual)
                ))
            })
    }

    /// Populates the current-version store with the precache manifest.
    ///
    /// Every manifest path must come back as a successful same-origin
    /// response; any fetch or store failure fails the install and leaves
    /// the manager unusable. Completion moves to `Waiting`, from which
    /// the caller activates immediately — there is no wait for older
    /// instances to wind down.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Lifecycle`] when called twice, or a fetch /
    /// storage error from the failing manifest entry.
    pub async fn install(&self) -> Result<(), CacheError> {
        self.transition(Lifecycle::Created, Lifecycle::Installing)?;

        for path in &self.precache {
            let response = self.origin.fetch(path).await?;
            if !response.is_cacheable() {
                return Err(CacheError::Network {
                    path: path.clone(),
                    message: format!("precache fetch returned status {}", response.status),
                });
            }
            self.backend
                .put(&self.version, path, response.into_asset())
                .await?;
        }

        self.transition(Lifecycle::Installing, Lifecycle::Waiting)?;
        info!(
            version = %self.version,
            assets = self.precache.len(),
            "precache installed"
        );
        Ok(())
    }

    /// Garbage-collects stale stores and begins servicing cache-first.
    ///
    /// Only valid from `Waiting`, which also keeps it from ever running
    /// concurrently with an install.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Lifecycle`] when not `Waiting`, or a storage
    /// error from enumeration/removal.
    pub async fn activate(&self) -> Result<(), CacheError> {
        if self.lifecycle() != Lifecycle::Waiting {
            return Err(CacheError::Lifecycle(format!(
                "activate requested while {}",
                self.lifecycle()
            )));
        }

        let mut removed = 0usize;
        for name in self.backend.store_names().await? {
            if name != self.version {
                self.backend.remove_store(&name).await?;
                removed += 1;
            }
        }

        self.transition(Lifecycle::Waiting, Lifecycle::Active)?;
        info!(version = %self.version, removed, "cache activated");
        Ok(())
    }

    /// Answers one request.
    ///
    /// Cache-first with network fallback for handled GETs; unconditional
    /// pass-through for everything else. Before activation completes,
    /// handled requests bypass the cache entirely rather than serving
    /// from a store that is still being populated.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Offline`] when the network is down and the
    /// root document is not cached either; otherwise propagates the
    /// network error from pass-through or pre-activation fetches.
    pub async fn fetch(&self, request: AssetRequest) -> Result<FetchOutcome, CacheError> {
        if !request.is_handled() {
            let response = self
                .origin
                .forward(&request.method, &request.path, request.body)
                .await?;
            return Ok(FetchOutcome {
                asset: response.into_asset(),
                served_from: ServedFrom::PassThrough,
                background_write: None,
            });
        }

        if self.lifecycle() != Lifecycle::Active {
            debug!(path = %request.path, state = %self.lifecycle(), "fetch before activation; bypassing cache");
            let response = self.origin.fetch(&request.path).await?;
            return Ok(FetchOutcome {
                asset: response.into_asset(),
                served_from: ServedFrom::Network,
                background_write: None,
            });
        }

        // Cache-first: a hit never touches the network.
        match self.backend.get(&self.version, &request.path).await {
            Ok(Some(hit)) => {
                return Ok(FetchOutcome {
                    asset: hit,
                    served_from: ServedFrom::Cache,
                    background_write: None,
                });
            }
            Ok(None) => {}
            // A failing read is a miss; the network still gets its chance.
            Err(err) => warn!(path = %request.path, %err, "cache read failed"),
        }

        match self.origin.fetch(&request.path).await {
            Ok(response) => {
                let background_write = response.is_cacheable().then(|| {
                    let backend = Arc::clone(&self.backend);
                    let version = self.version.clone();
                    let path = request.path.clone();
                    let asset = CachedAsset {
                        status: response.status,
                        content_type: response.content_type.clone(),
                        body: response.body.clone(),
                    };
                    tokio::spawn(async move {
                        if let Err(err) = backend.put(&version, &path, asset).await {
                            warn!(path, %err, "cache write failed");
                        }
                    })
                });

                Ok(FetchOutcome {
                    asset: response.into_asset(),
                    served_from: ServedFrom::Network,
                    background_write,
                })
            }
            Err(err) => {
                debug!(path = %request.path, %err, "network fetch failed; trying cached shell");
                match self.backend.get(&self.version, &self.root_path).await {
                    Ok(Some(shell)) => Ok(FetchOutcome {
                        asset: shell,
                        served_from: ServedFrom::Fallback,
                        background_write: None,
                    }),
                    _ => Err(CacheError::Offline {
                        path: request.path,
                    }),
                }
            }
        }
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("version", &self.version)
            .field("lifecycle", &self.lifecycle())
            .field("precache", &self.precache.len())
            .finish_non_exhaustive()
    }
}
