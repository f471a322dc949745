//! Cached view responses.
//!
//! Wraps a GET route and serves the buffered response for repeat requests.
//! Entries are keyed by view name, acting user, locale, and a digest of the
//! full request path, so two users (or two locales) never share a page.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, Response as HttpResponse, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::permissions::Identity;

use super::backend::CacheBackend;
use super::keys::view_key;
use super::object::{decode, encode};

const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

const METRIC_VIEW_HIT: &str = "kontur_cache_view_hit_total";
const METRIC_VIEW_MISS: &str = "kontur_cache_view_miss_total";

/// Per-route state for the view cache layer.
#[derive(Clone)]
pub struct ViewCacheState {
    pub backend: Arc<dyn CacheBackend>,
    pub view: &'static str,
    pub ttl: Duration,
    pub enabled: bool,
}

/// A buffered response as stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedHttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Middleware for view response caching.
///
/// Only GET requests are cached, and only 2xx responses enter the cache.
/// Writes never pass through here; handlers invalidate explicitly instead.
#[instrument(skip_all, fields(view = cache.view, path = %request.uri().path()))]
pub async fn view_cache_layer(
    State(cache): State<ViewCacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.enabled {
        return next.run(request).await;
    }

    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_else(Identity::anonymous);

    let full_path = full_path(&request);
    let key = view_key(cache.view, identity.user, &identity.locale, &full_path);

    if let Some(bytes) = cache.backend.get(&key) {
        if let Some(cached) = decode::<CachedHttpResponse>(&key, &bytes) {
            debug!(outcome = "hit", "serving cached view");
            counter!(METRIC_VIEW_HIT).increment(1);
            return build_response(cached);
        }
        cache.backend.delete(&key);
    }

    debug!(outcome = "miss", "rendering view");
    counter!(METRIC_VIEW_MISS).increment(1);

    let response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(key, error = %error, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if bytes.len() <= MAX_CACHED_BODY_BYTES {
        let cached = CachedHttpResponse {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.to_string(), value.to_string()))
                })
                .collect(),
            body: bytes.to_vec(),
        };
        if let Some(encoded) = encode(&key, &cached) {
            cache.backend.set(&key, encoded, cache.ttl);
        }
    } else {
        // Too large to cache; the caller still gets the full response.
        debug!(key, size = bytes.len(), "response exceeds cache cap, serving uncached");
    }

    HttpResponse::from_parts(parts, Body::from(bytes))
}

/// Path plus query string, matching what the handler actually served.
fn full_path(request: &Request<Body>) -> String {
    match request.uri().query() {
        Some(query) => format!("{}?{query}", request.uri().path()),
        None => request.uri().path().to_string(),
    }
}

fn build_response(cached: CachedHttpResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
