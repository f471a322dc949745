//! Request context, identity resolution, permission gate and response logs.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::permissions::{Action, Identity, PermissionGate, Role};
use crate::domain::types::EntityKind;

use super::error::{ApiError, ErrorReport};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve the acting identity from trusted proxy headers. Requests without
/// the headers run as anonymous; malformed values are treated as absent.
pub async fn resolve_identity(mut request: Request<Body>, next: Next) -> Response {
    let headers = request.headers();

    let user = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok());
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Role>().ok());
    let locale = headers
        .get(axum::http::header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(primary_locale)
        .unwrap_or_else(|| "en".to_string());

    request
        .extensions_mut()
        .insert(Identity { user, role, locale });
    next.run(request).await
}

/// First language tag of an Accept-Language header, lowercased. Quality
/// weights are ignored; the client's top preference decides the cache slot.
fn primary_locale(header: &str) -> String {
    let tag = header
        .split(',')
        .next()
        .unwrap_or("en")
        .split(';')
        .next()
        .unwrap_or("en")
        .trim();
    if tag.is_empty() || tag == "*" {
        return "en".to_string();
    }
    tag.to_ascii_lowercase()
}

/// Per-router permission state: which entity type the wrapped routes serve.
#[derive(Clone)]
pub struct PermissionState {
    pub gate: Arc<dyn PermissionGate>,
    pub kind: EntityKind,
    /// Override for routes that demand a dedicated permission regardless of
    /// the HTTP method, such as the advertisement statistics view.
    pub action: Option<Action>,
}

pub async fn require_permission(
    State(state): State<PermissionState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_else(Identity::anonymous);

    let Some(role) = identity.role else {
        return if identity.is_authenticated() {
            ApiError::forbidden().into_response()
        } else {
            ApiError::unauthorized().into_response()
        };
    };

    let action = state
        .action
        .or_else(|| action_for_method(request.method()));
    let Some(action) = action else {
        return ApiError::bad_request("unsupported method").into_response();
    };

    if !state.gate.allows(role, action, state.kind) {
        return ApiError::forbidden().into_response();
    }

    next.run(request).await
}

fn action_for_method(method: &Method) -> Option<Action> {
    match *method {
        Method::GET | Method::HEAD => Some(Action::View),
        Method::POST => Some(Action::Add),
        Method::PUT | Method::PATCH => Some(Action::Change),
        Method::DELETE => Some(Action::Delete),
        _ => None,
    }
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let user = request
        .extensions()
        .get::<Identity>()
        .and_then(|identity| identity.user);

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "kontur::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user = user.map(|id| id.to_string()).unwrap_or_default(),
                "request failed",
            );
        } else {
            warn!(
                target = "kontur::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user = user.map(|id| id.to_string()).unwrap_or_default(),
                "client request error",
            );
        }
    }

    response
}
