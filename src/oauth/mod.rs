//! OAuth 2.0 authorization code flow, ending in an issued secret.
//!
//! 1. Client hits GET /authorize → redirected to the provider's consent screen
//! 2. Provider redirects back to GET /callback?code=...
//! 3. Code is exchanged for an access token
//! 4. Access token is exchanged for the account id
//! 5. The account id's secret is returned, minted on first use

mod exchange;
pub mod provider;

pub use exchange::{exchange_code_for_token, fetch_identity};
pub use provider::ProviderConfig;

use crate::identity::IdentityStore;
use anyhow::{Context, Result};
use tracing::{debug, info};


/// Exchange errors
#[derive(Debug)]
pub enum ExchangeError {
    /// Code missing or empty
    BadRequest(String),
    /// Provider rejected the code (expired, reused, unknown)
    InvalidCode(String),
    /// Provider could not be reached or the identity lookup failed
    UpstreamUnavailable(String),
    /// Identity store failure
    Store(anyhow::Error),
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ExchangeError::InvalidCode(msg) => write!(f, "Invalid authorization code: {}", msg),
            ExchangeError::UpstreamUnavailable(msg) => {
                write!(f, "Identity provider unavailable: {}", msg)
            }
            ExchangeError::Store(e) => write!(f, "Failed to issue secret: {}", e),
        }
    }
}

impl std::error::Error for ExchangeError {}

/// Turns provider authorization codes into issued secrets.
#[derive(Clone)]
pub struct OAuthExchange {
    provider: ProviderConfig,
    client: reqwest::Client,
    identities: IdentityStore,
}

impl OAuthExchange {
    pub fn new(provider: ProviderConfig, identities: IdentityStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("settings-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(provider.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            provider,
            client,
            identities,
        })
    }

    /// Consent screen URL for GET /authorize
    pub fn authorize_url(&self) -> String {
        self.provider.build_auth_url()
    }

    /// Exchange `code` for the caller's secret.
    ///
    /// Idempotent per identity: later exchanges return the secret minted by
    /// the first one and do not write to the store.
    pub async fn exchange(&self, code: Option<&str>) -> Result<String, ExchangeError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ExchangeError::BadRequest("Missing 'code' parameter".to_string()))?;

        let access_token = exchange_code_for_token(&self.client, &self.provider, code).await?;
        debug!("Authorization code exchanged for access token");

        let identity = fetch_identity(&self.client, &self.provider, &access_token).await?;

        let issued = self
            .identities
            .issue(&identity)
            .await
            .map_err(ExchangeError::Store)?;

        info!(created = issued.created, "Secret issued");
        Ok(issued.secret)
    }
}
