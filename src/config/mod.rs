//! Service configuration.
//!
//! Built once at startup and handed to each component; nothing reads the
//! environment after that. Values come from `SYNC_*` environment variables,
//! optionally layered over a TOML file named by `SYNC_CONFIG`.

use crate::hasher::Pepper;
use crate::oauth::provider::{
    DEFAULT_AUTHORIZE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL, DEFAULT_USER_URL,
};
use crate::oauth::ProviderConfig;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_STORE_URI: &str = "sqlite://settings-sync.db";
pub const DEFAULT_MAX_SETTINGS_BYTES: usize = 1_048_576; // 1 MB
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Complete, validated configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Backing store connection URI (see [`crate::kv::open`])
    pub store_uri: String,
    /// Pepper for the secrets namespace
    pub secrets_pepper: Pepper,
    /// Pepper for the settings namespace
    pub settings_pepper: Pepper,
    pub provider: ProviderConfig,
    /// Largest accepted settings payload in bytes
    pub max_settings_bytes: usize,
    pub host: String,
    pub port: u16,
}

/// Raw file / environment values before validation. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub store_uri: Option<String>,
    pub secrets_pepper: Option<String>,
    pub settings_pepper: Option<String>,
    pub max_settings_bytes: Option<usize>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub oauth: OAuthFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthFile {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub authorize_url: Option<String>,
    pub token_url: Option<String>,
    pub user_url: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Load from the process environment (and `SYNC_CONFIG`, if set).
    pub fn load() -> Result<Self> {
        let file = match std::env::var("SYNC_CONFIG") {
            Ok(path) => load_config_file(&path)?,
            Err(_) => ConfigFile::default(),
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    /// Merge `file` with values from `env` (which win) and validate.
    pub fn from_sources<F>(file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(name).filter(|v| !v.is_empty());

        let store_uri = var("SYNC_STORE_URI")
            .or(file.store_uri)
            .unwrap_or_else(|| DEFAULT_STORE_URI.to_string());

        let secrets_pepper = var("SYNC_SECRETS_PEPPER")
            .or(file.secrets_pepper)
            .ok_or_else(|| anyhow!("SYNC_SECRETS_PEPPER is required"))?;
        let settings_pepper = var("SYNC_SETTINGS_PEPPER")
            .or(file.settings_pepper)
            .ok_or_else(|| anyhow!("SYNC_SETTINGS_PEPPER is required"))?;
        if secrets_pepper == settings_pepper {
            bail!("SYNC_SECRETS_PEPPER and SYNC_SETTINGS_PEPPER must differ");
        }

        let max_settings_bytes = match var("SYNC_MAX_SETTINGS_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .context("SYNC_MAX_SETTINGS_BYTES must be a non-negative integer")?,
            None => file
                .max_settings_bytes
                .unwrap_or(DEFAULT_MAX_SETTINGS_BYTES),
        };

        let host = var("SYNC_HOST")
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("SYNC_PORT") {
            Some(v) => v.parse::<u16>().context("SYNC_PORT must be a valid port number")?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let oauth = file.oauth;
        let timeout_secs = match var("SYNC_OAUTH_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("SYNC_OAUTH_TIMEOUT_SECS must be a whole number of seconds")?,
            None => oauth.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            bail!("SYNC_OAUTH_TIMEOUT_SECS must be greater than zero");
        }

        let scopes = match var("SYNC_OAUTH_SCOPES") {
            Some(v) => v
                .split([',', ' '])
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
            None => oauth.scopes.unwrap_or_default(),
        };

        let provider = ProviderConfig {
            authorize_url: var("SYNC_OAUTH_AUTHORIZE_URL")
                .or(oauth.authorize_url)
                .unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string()),
            token_url: var("SYNC_OAUTH_TOKEN_URL")
                .or(oauth.token_url)
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            user_url: var("SYNC_OAUTH_USER_URL")
                .or(oauth.user_url)
                .unwrap_or_else(|| DEFAULT_USER_URL.to_string()),
            scopes,
            client_id: var("SYNC_OAUTH_CLIENT_ID")
                .or(oauth.client_id)
                .ok_or_else(|| anyhow!("SYNC_OAUTH_CLIENT_ID is required"))?,
            client_secret: var("SYNC_OAUTH_CLIENT_SECRET")
                .or(oauth.client_secret)
                .ok_or_else(|| anyhow!("SYNC_OAUTH_CLIENT_SECRET is required"))?,
            redirect_uri: var("SYNC_OAUTH_REDIRECT_URI")
                .or(oauth.redirect_uri)
                .ok_or_else(|| anyhow!("SYNC_OAUTH_REDIRECT_URI is required"))?,
            timeout_secs,
        };

        Ok(Self {
            store_uri,
            secrets_pepper: Pepper::new(secrets_pepper),
            settings_pepper: Pepper::new(settings_pepper),
            provider,
            max_settings_bytes,
            host,
            port,
        })
    }

    /// `host:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration values from a TOML file
pub fn load_config_file(path: &str) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))
}
