//! OAuth endpoints: GET /authorize and GET /callback.

use super::ApiError;
use crate::oauth::OAuthExchange;
use axum::{
    extract::{Query, State},
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state for OAuth API
#[derive(Clone)]
pub struct OAuthAppState {
    pub exchange: OAuthExchange,
}

/// OAuth callback query parameters
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Issued secret, returned once per successful callback
#[derive(Serialize)]
pub struct SecretResponse {
    secret: String,
}

/// Create OAuth API router
pub fn create_oauth_router(state: OAuthAppState) -> Router {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
        .with_state(Arc::new(state))
}

/// GET /authorize
///
/// Redirects the user to the provider's consent screen.
async fn authorize(State(state): State<Arc<OAuthAppState>>) -> Redirect {
    debug!("Redirecting to OAuth provider");
    Redirect::temporary(&state.exchange.authorize_url())
}

/// GET /callback?code=<code>
///
/// Exchanges the code for the caller's identity and returns its secret.
async fn callback(
    State(state): State<Arc<OAuthAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Json<SecretResponse>, ApiError> {
    if let Some(error) = callback.error {
        let description = callback
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!(error = %error, description = %description, "OAuth authorization failed");
        return Err(ApiError::BadRequest(format!(
            "OAuth authorization failed: {} - {}",
            error, description
        )));
    }

    let secret = state
        .exchange
        .exchange(callback.code.as_deref())
        .await
        .map_err(|e| {
            warn!(error = %e, "OAuth exchange failed");
            ApiError::from(e)
        })?;

    info!("OAuth flow completed");
    Ok(Json(SecretResponse { secret }))
}
