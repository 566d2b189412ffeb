//! Origin access for the cache manager.
//!
//! The fetch policy never talks to the network directly; it calls an
//! [`Origin`] collaborator, so tests can substitute fakes for real I/O.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect;
use tracing::debug;

use crate::cache::storage::CachedAsset;
use crate::error::CacheError;

/// Provenance of an origin response, mirroring what the cache policy is
/// allowed to retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response with readable status and body.
    Basic,
    /// Response from outside the configured origin; served, never stored.
    Opaque,
}

/// A response obtained from the origin.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content type header, when present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
    /// Provenance classification.
    pub kind: ResponseKind,
}

impl OriginResponse {
    /// Whether the cache policy may store this response: a successful
    /// same-origin response, nothing else.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Converts into the stored form.
    #[must_use]
    pub fn into_asset(self) -> CachedAsset {
        CachedAsset {
            status: self.status,
            content_type: self.content_type,
            body: self.body,
        }
    }
}

/// Network collaborator the fetch policy calls on cache miss.
#[async_trait]
pub trait Origin: Send + Sync {
    /// GETs a path from the origin.
    async fn fetch(&self, path: &str) -> Result<OriginResponse, CacheError>;

    /// Forwards a request untouched (non-GET pass-through).
    async fn forward(
        &self,
        method: &str,
        path: &str,
        body: Bytes,
    ) -> Result<OriginResponse, CacheError>;
}

// ============================================================================
// HttpOrigin
// ============================================================================

/// HTTP origin backed by `reqwest`.
///
/// Redirects are disabled: a response that would leave the configured
/// origin comes back as its 3xx rather than being followed. Every request
/// runs under an explicit timeout; a timeout is a network failure and
/// takes the caller's offline fallback path.
pub struct HttpOrigin {
    client: reqwest::Client,
    base_url: reqwest::Url,
    timeout: Duration,
}

impl HttpOrigin {
    /// Creates an origin rooted at `base_url`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should never happen).
    #[must_use]
    pub fn new(base_url: reqwest::Url, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url,
            timeout,
        }
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, CacheError> {
        self.base_url.join(path).map_err(|err| CacheError::Network {
            path: path.to_string(),
            message: format!("invalid request path: {err}"),
        })
    }

    fn classify(&self, final_url: &reqwest::Url) -> ResponseKind {
        let same_origin = final_url.scheme() == self.base_url.scheme()
            && final_url.host_str() == self.base_url.host_str()
            && final_url.port_or_known_default() == self.base_url.port_or_known_default();
        if same_origin {
            ResponseKind::Basic
        } else {
            ResponseKind::Opaque
        }
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<OriginResponse, CacheError> {
        let network_err = |message: String| CacheError::Network {
            path: path.to_string(),
            message,
        };

        let url = self.url_for(path)?;
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|err| network_err(format!("invalid method: {err}")))?;

        debug!(%method, %url, "origin fetch");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| network_err("request timed out".to_string()))?
            .map_err(|err| network_err(err.to_string()))?;

        let status = response.status().as_u16();
        let kind = self.classify(response.url());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let body = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| network_err("body read timed out".to_string()))?
            .map_err(|err| network_err(err.to_string()))?;

        Ok(OriginResponse {
            status,
            content_type,
            body,
            kind,
        })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(&self, path: &str) -> Result<OriginResponse, CacheError> {
        self.execute("GET", path, None).await
    }

    async fn forward(
        &self,
        method: &str,
        path: &str,
        body: Bytes,
    ) -> Result<OriginResponse, CacheError> {
        self.execute(method, path, Some(body)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
