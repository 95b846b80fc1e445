//! Settings endpoints on /settings.
//!
//! Every method sits behind [`require_auth`], which resolves the caller to
//! an [`AuthenticatedUser`] and attaches it to the request before any
//! handler runs.

use super::ApiError;
use crate::auth::{authenticate, AuthenticatedUser};
use crate::identity::IdentityStore;
use crate::settings::{
    is_settings_content_type, SettingsStore, WriteError, Written, SETTINGS_CONTENT_TYPE,
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Extension, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state for the settings API
#[derive(Clone)]
pub struct SettingsAppState {
    pub identities: IdentityStore,
    pub settings: SettingsStore,
}

/// Auth middleware: resolves the authorization header to a user.
///
/// Runs as a route layer, so no settings handler can be reached without it.
async fn require_auth(
    State(state): State<Arc<SettingsAppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(req.headers(), &state.identities)
        .await
        .map_err(|e| {
            warn!(reason = e.reason(), method = %req.method(), "Settings request rejected");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Create settings API router with auth middleware applied
pub fn create_settings_router(state: SettingsAppState) -> Router {
    // One byte of headroom so the store's own size check decides the boundary.
    let body_limit = state.settings.max_bytes().saturating_add(1);
    let state = Arc::new(state);

    Router::new()
        .route(
            "/settings",
            get(read_settings)
                .head(peek_settings)
                .put(write_settings)
                .delete(delete_settings),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Whether an `If-None-Match` header matches the current version marker.
///
/// Plain equality against each listed tag; quotes and weak prefixes are ignored.
pub fn if_none_match(headers: &HeaderMap, written: i64) -> bool {
    let Some(value) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let current = written.to_string();
    value.split(',').map(str::trim).any(|tag| {
        let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');
        tag == "*" || tag == current
    })
}

/// HEAD /settings - version marker only
async fn peek_settings(
    State(state): State<Arc<SettingsAppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(Written { written }) = state.settings.peek(&user).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let status = if if_none_match(&headers, written) {
        StatusCode::NOT_MODIFIED
    } else {
        StatusCode::OK
    };
    Ok((status, [(header::ETAG, written.to_string())]).into_response())
}

/// GET /settings - full blob plus version marker
async fn read_settings(
    State(state): State<Arc<SettingsAppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let record = state
        .settings
        .read(&user)
        .await?
        .ok_or_else(|| ApiError::NotFound("No settings stored".to_string()))?;

    let etag = record.written.to_string();
    if if_none_match(&headers, record.written) {
        debug!(written = record.written, "Settings not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        StatusCode::OK,
        [
            (header::ETAG, etag),
            (header::CONTENT_TYPE, SETTINGS_CONTENT_TYPE.to_string()),
        ],
        record.value,
    )
        .into_response())
}

/// PUT /settings - replace the blob
async fn write_settings(
    State(state): State<Arc<SettingsAppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Written>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    // Content type is judged before the body so an oversized upload of the
    // wrong type still reports 415.
    if !is_settings_content_type(content_type) {
        return Err(ApiError::from(WriteError::UnsupportedMediaType(
            content_type.map(|ct| ct.to_string()),
        )));
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::from(WriteError::PayloadTooLarge {
                limit: state.settings.max_bytes(),
            })
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let written = state.settings.write(&user, content_type, body.to_vec()).await?;
    info!(bytes = body.len(), written = written.written, "Settings updated");
    Ok(Json(written))
}

/// DELETE /settings - idempotent removal
async fn delete_settings(
    State(state): State<Arc<SettingsAppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    state.settings.delete(&user).await?;
    info!("Settings deleted");
    Ok(StatusCode::NO_CONTENT)
}
