//! Calls to the identity provider.
//!
//! Two round trips: authorization code → access token, then access token →
//! account id. Each is attempted exactly once.

use super::provider::ProviderConfig;
use super::ExchangeError;
use serde::Deserialize;
use std::collections::HashMap;

/// OAuth token response (standard OAuth 2.0, plus GitHub's error fields)
///
/// GitHub answers a bad or reused code with `200 {"error": ...}`, so both
/// fields are optional.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Account lookup response; only the id is used.
#[derive(Deserialize, Debug)]
struct UserResponse {
    id: AccountId,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum AccountId {
    Number(u64),
    Text(String),
}

impl AccountId {
    fn into_string(self) -> String {
        match self {
            AccountId::Number(n) => n.to_string(),
            AccountId::Text(s) => s,
        }
    }
}

/// Exchange authorization code for access token
///
/// # Errors
/// - InvalidCode: provider rejected the code (4xx, `error` body, or no token)
/// - UpstreamUnavailable: the request could not be completed or the provider
///   answered 5xx
pub async fn exchange_code_for_token(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    code: &str,
) -> Result<String, ExchangeError> {
    let mut form_data = HashMap::new();
    form_data.insert("grant_type", "authorization_code");
    form_data.insert("code", code);
    form_data.insert("redirect_uri", provider.redirect_uri.as_str());
    form_data.insert("client_id", provider.client_id.as_str());
    form_data.insert("client_secret", provider.client_secret.as_str());

    tracing::debug!("Exchanging authorization code for token at {}", provider.token_url);

    let response = client
        .post(&provider.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .map_err(|e| {
            ExchangeError::UpstreamUnavailable(format!("Token request failed: {}", e))
        })?;

    let status = response.status();
    if status.is_server_error() {
        return Err(ExchangeError::UpstreamUnavailable(format!(
            "Token endpoint returned status {}",
            status
        )));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ExchangeError::InvalidCode(format!(
            "Token exchange failed with status {}: {}",
            status, body
        )));
    }

    let token_response: TokenResponse = response.json().await.map_err(|e| {
        ExchangeError::UpstreamUnavailable(format!("Failed to parse token response: {}", e))
    })?;

    if let Some(error) = token_response.error {
        let description = token_response
            .error_description
            .unwrap_or_else(|| "no description".to_string());
        return Err(ExchangeError::InvalidCode(format!("{} - {}", error, description)));
    }

    tracing::debug!(
        token_type = ?token_response.token_type,
        "Token exchange successful"
    );

    token_response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ExchangeError::InvalidCode("Token response had no access_token".to_string()))
}

/// Fetch the provider's account id for the holder of `access_token`
///
/// Any failure here is an upstream fault, since the token was just issued.
pub async fn fetch_identity(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    access_token: &str,
) -> Result<String, ExchangeError> {
    let response = client
        .get(&provider.user_url)
        .header("Accept", "application/json")
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| {
            ExchangeError::UpstreamUnavailable(format!("Identity request failed: {}", e))
        })?;

    if !response.status().is_success() {
        return Err(ExchangeError::UpstreamUnavailable(format!(
            "Identity lookup failed with status {}",
            response.status()
        )));
    }

    let user: UserResponse = response.json().await.map_err(|e| {
        ExchangeError::UpstreamUnavailable(format!("Failed to parse identity response: {}", e))
    })?;

    let identity = user.id.into_string();
    if identity.is_empty() {
        return Err(ExchangeError::UpstreamUnavailable(
            "Identity response had an empty id".to_string(),
        ));
    }
    Ok(identity)
}
