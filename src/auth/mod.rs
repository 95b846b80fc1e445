use crate::identity::IdentityStore;
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};


/// Identity resolved by [`authenticate`], threaded explicitly into every
/// settings operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    identity: String,
}

impl AuthenticatedUser {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Decoded `identity:secret` pair from the authorization header
#[derive(Debug, PartialEq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    /// Authorization header not present
    Missing,
    /// Header is not base64("identity:secret") with both parts non-empty
    Malformed,
    /// No secret on record, or the supplied secret does not match
    Invalid,
    /// Identity store could not be consulted
    Store(anyhow::Error),
}

impl AuthError {
    /// Short reason code: "missing", "malformed" or "invalid".
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::Malformed => "malformed",
            AuthError::Invalid => "invalid",
            AuthError::Store(_) => "unavailable",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing => write!(f, "Authorization credentials not provided"),
            AuthError::Malformed => write!(f, "Invalid authorization credentials format"),
            AuthError::Invalid => write!(f, "Invalid authorization credentials"),
            AuthError::Store(e) => write!(f, "Failed to verify credentials: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

/// Extract credentials from the HTTP Authorization header
///
/// Expected format: "Authorization: base64(identity:secret)". A leading
/// "Basic " scheme is accepted and ignored.
pub fn extract_credentials(headers: &HeaderMap) -> Result<Credentials, AuthError> {
    let header = headers
        .get("authorization")
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    parse_credentials(header)
}

/// Parse credentials from an Authorization header value
pub fn parse_credentials(header_value: &str) -> Result<Credentials, AuthError> {
    let encoded = header_value.trim();
    let encoded = match encoded.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("basic") => rest.trim(),
        Some(_) => return Err(AuthError::Malformed),
        None => encoded,
    };

    if encoded.is_empty() {
        return Err(AuthError::Malformed);
    }

    let decoded = BASE64.decode(encoded).map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    // Split on the first ':'; the secret itself may not be empty.
    let (identity, secret) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
    if identity.is_empty() || secret.is_empty() {
        return Err(AuthError::Malformed);
    }

    Ok(Credentials {
        identity: identity.to_string(),
        secret: secret.to_string(),
    })
}

/// Resolve request headers to an authenticated user
///
/// # Flow
/// 1. Decode `identity:secret` from the Authorization header
/// 2. Look up the secret issued to `identity`
/// 3. Compare in constant time
///
/// # Errors
/// - Missing: no Authorization header
/// - Malformed: header does not decode to two non-empty parts
/// - Invalid: no secret on record or secret mismatch
/// - Store: backing store failure
pub async fn authenticate(
    headers: &HeaderMap,
    identities: &IdentityStore,
) -> Result<AuthenticatedUser, AuthError> {
    let credentials = extract_credentials(headers)?;

    let valid = identities
        .verify(&credentials.identity, &credentials.secret)
        .await
        .map_err(AuthError::Store)?;
    if !valid {
        return Err(AuthError::Invalid);
    }

    Ok(AuthenticatedUser::new(credentials.identity))
}
