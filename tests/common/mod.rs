// Shared helpers for router-level tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use settings_sync::{
    api::create_app,
    config::{ConfigFile, ServiceConfig},
    hasher::Pepper,
    identity::IdentityStore,
    kv::{MemoryKvStore, SharedKvStore},
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRETS_PEPPER: &str = "test-secrets-pepper";
pub const SETTINGS_PEPPER: &str = "test-settings-pepper";

/// Config with the provider pointed at `provider_url` (a mock server).
pub fn test_config(provider_url: &str, max_settings_bytes: usize) -> ServiceConfig {
    let env = HashMap::from([
        ("SYNC_STORE_URI", "memory://".to_string()),
        ("SYNC_SECRETS_PEPPER", SECRETS_PEPPER.to_string()),
        ("SYNC_SETTINGS_PEPPER", SETTINGS_PEPPER.to_string()),
        ("SYNC_OAUTH_CLIENT_ID", "client-id".to_string()),
        ("SYNC_OAUTH_CLIENT_SECRET", "client-secret".to_string()),
        ("SYNC_OAUTH_REDIRECT_URI", "http://localhost:3000/callback".to_string()),
        ("SYNC_OAUTH_AUTHORIZE_URL", format!("{}/login/oauth/authorize", provider_url)),
        ("SYNC_OAUTH_TOKEN_URL", format!("{}/login/oauth/access_token", provider_url)),
        ("SYNC_OAUTH_USER_URL", format!("{}/user", provider_url)),
        ("SYNC_OAUTH_TIMEOUT_SECS", "5".to_string()),
        ("SYNC_MAX_SETTINGS_BYTES", max_settings_bytes.to_string()),
    ]);
    ServiceConfig::from_sources(ConfigFile::default(), |name| env.get(name).cloned())
        .expect("test config should be valid")
}

pub struct TestApp {
    pub router: Router,
    pub kv: Arc<MemoryKvStore>,
    pub identities: IdentityStore,
}

pub fn test_app(provider_url: &str, max_settings_bytes: usize) -> TestApp {
    let config = test_config(provider_url, max_settings_bytes);
    let kv = Arc::new(MemoryKvStore::new());
    let shared: SharedKvStore = kv.clone();
    let router = create_app(&config, shared.clone()).expect("router should build");
    let identities = IdentityStore::new(shared, Pepper::new(SECRETS_PEPPER));
    TestApp {
        router,
        kv,
        identities,
    }
}

pub fn basic(identity: &str, secret: &str) -> String {
    BASE64.encode(format!("{}:{}", identity, secret))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
