// HTTP API

mod error;
mod index;
pub mod oauth;
pub mod settings;

pub use error::ApiError;
pub use index::create_index_router;
pub use oauth::{create_oauth_router, OAuthAppState};
pub use settings::{create_settings_router, SettingsAppState};

use crate::config::ServiceConfig;
use crate::identity::IdentityStore;
use crate::kv::SharedKvStore;
use crate::oauth::OAuthExchange;
use crate::settings::SettingsStore;
use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;

/// Build the full application router over `kv`.
///
/// Both stores share `kv`; their keys are kept apart by the two peppers.
pub fn create_app(config: &ServiceConfig, kv: SharedKvStore) -> Result<Router> {
    let identities = IdentityStore::new(kv.clone(), config.secrets_pepper.clone());
    let settings = SettingsStore::new(
        kv,
        config.settings_pepper.clone(),
        config.max_settings_bytes,
    );
    let exchange = OAuthExchange::new(config.provider.clone(), identities.clone())?;

    Ok(Router::new()
        .merge(create_index_router())
        .merge(create_oauth_router(OAuthAppState { exchange }))
        .merge(create_settings_router(SettingsAppState {
            identities,
            settings,
        }))
        .layer(CorsLayer::permissive()))
}
