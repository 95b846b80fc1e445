//! Identity provider configuration.
//!
//! Defaults point at GitHub; every endpoint can be overridden so tests (and
//! GitHub Enterprise installs) can swap in their own base URLs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_USER_URL: &str = "https://api.github.com/user";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// OAuth provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Consent screen URL
    pub authorize_url: String,

    /// Token exchange endpoint URL
    pub token_url: String,

    /// Endpoint returning the authenticated account (`{"id": ...}`)
    pub user_url: String,

    /// Requested scopes (may be empty)
    pub scopes: Vec<String>,

    pub client_id: String,

    pub client_secret: String,

    /// Callback URL registered with the provider
    pub redirect_uri: String,

    /// Upper bound on each outbound provider call
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// GitHub endpoints with the given application credentials.
    pub fn github(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            user_url: DEFAULT_USER_URL.to_string(),
            scopes: Vec::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the consent URL clients are redirected to
    pub fn build_auth_url(&self) -> String {
        let mut url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
        );
        if !self.scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(&self.scopes.join(" ")));
        }
        url
    }
}

// client_secret stays out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("user_url", &self.user_url)
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
