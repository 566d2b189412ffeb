//! HTTP gateway serving the app shell through the cache manager.
//!
//! Every inbound request is converted to an [`AssetRequest`] and answered
//! by [`CacheManager::fetch`]; the offline-with-no-fallback state maps to
//! 503 so clients see a classified failure instead of a hung connection.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::manager::{AssetRequest, CacheManager};
use crate::cache::storage::CachedAsset;
use crate::error::{CacheError, GatewayError};

/// Upper bound on buffered pass-through request bodies.
const MAX_PASSTHROUGH_BODY: usize = 2 * 1024 * 1024;

/// Builds the gateway router around a cache manager.
#[must_use]
pub fn build_router(manager: Arc<CacheManager>) -> Router {
    Router::new().fallback(handle_asset).with_state(manager)
}

/// Binds and runs the gateway until the token is cancelled.
///
/// # Errors
///
/// Returns [`GatewayError::Bind`] if the listener cannot bind, or an I/O
/// error from the serve loop.
pub async fn run(
    manager: Arc<CacheManager>,
    bind_addr: &str,
    cancel: CancellationToken,
) -> Result<(), GatewayError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|err| GatewayError::Bind(format!("{bind_addr}: {err}")))?;
    let bound_addr: SocketAddr = listener.local_addr()?;
    info!(%bound_addr, version = manager.version(), "gateway listening");

    let router = build_router(manager);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    debug!("gateway shut down");
    Ok(())
}

async fn handle_asset(
    State(manager): State<Arc<CacheManager>>,
    request: Request,
) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    // Absolute-form URIs target another origin; they are forwarded,
    // never cached.
    let cross_origin = request.uri().host().is_some();

    let body = match axum::body::to_bytes(request.into_body(), MAX_PASSTHROUGH_BODY).await {
        Ok(body) => body,
        Err(err) => {
            warn!(%request_id, %err, "request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let asset_request = AssetRequest {
        method: method.clone(),
        path: path.clone(),
        cross_origin,
        body,
    };

    match manager.fetch(asset_request).await {
        Ok(outcome) => {
            debug!(
                %request_id,
                method,
                path,
                served = ?outcome.served_from,
                status = outcome.asset.status,
                "request served"
            );
            asset_response(outcome.asset)
        }
        Err(CacheError::Offline { .. }) => {
            warn!(%request_id, path, "offline and no cached shell");
            (StatusCode::SERVICE_UNAVAILABLE, "offline and no cached shell").into_response()
        }
        Err(err) => {
            warn!(%request_id, path, %err, "gateway fetch failed");
            (StatusCode::BAD_GATEWAY, "upstream fetch failed").into_response()
        }
    }
}

fn asset_response(asset: CachedAsset) -> Response {
    let status = StatusCode::from_u16(asset.status).unwrap_or(StatusCode::OK);
    let mut builder = Response::builder().status(status);
    if let Some(content_type) = asset.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(asset.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_asset_response_carries_status_and_content_type() {
        let response = asset_response(CachedAsset {
            status: 200,
            content_type: Some("image/svg+xml".to_string()),
            body: Bytes::from("<svg/>"),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
    }

    #[test]
    fn test_asset_response_without_content_type() {
        let response = asset_response(CachedAsset {
            status: 404,
            content_type: None,
            body: Bytes::new(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
