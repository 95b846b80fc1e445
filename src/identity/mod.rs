//! Identity store: hashed external identity → issued secret.
//!
//! The raw identity is never persisted. Each identity maps to exactly one
//! secret, created on the first successful OAuth exchange and returned
//! unchanged on every later one.

use crate::hasher::{derive, KeyNamespace, Pepper};
use crate::kv::SharedKvStore;
use anyhow::{Context, Result};
use rand::RngCore;


/// Number of random bytes in an issued secret (hex encoded on the wire).
pub const SECRET_BYTES: usize = 48;

/// Result of [`IdentityStore::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    pub secret: String,
    /// True if this call minted the secret, false if it already existed.
    pub created: bool,
}

/// Maps `derive(secrets_pepper, identity)` to the identity's secret.
#[derive(Clone)]
pub struct IdentityStore {
    kv: SharedKvStore,
    pepper: Pepper,
}

impl IdentityStore {
    pub fn new(kv: SharedKvStore, pepper: Pepper) -> Self {
        Self { kv, pepper }
    }

    fn key_for(&self, identity: &str) -> String {
        derive(&self.pepper, identity).in_namespace(KeyNamespace::Secrets)
    }

    /// Look up the secret issued to `identity`.
    pub async fn get(&self, identity: &str) -> Result<Option<String>> {
        let raw = self
            .kv
            .get(&self.key_for(identity))
            .await
            .context("Failed to read identity secret")?;
        raw.map(|bytes| String::from_utf8(bytes).context("Stored secret is not valid UTF-8"))
            .transpose()
    }

    /// Replace the secret for `identity` unconditionally.
    pub async fn set(&self, identity: &str, secret: &str) -> Result<()> {
        self.kv
            .set(&self.key_for(identity), secret.as_bytes().to_vec())
            .await
            .context("Failed to write identity secret")
    }

    /// Return the existing secret for `identity`, minting one if none exists.
    ///
    /// Concurrent first-time calls for one identity all return the same
    /// secret; only the first insert wins.
    pub async fn issue(&self, identity: &str) -> Result<Issued> {
        if let Some(secret) = self.get(identity).await? {
            return Ok(Issued {
                secret,
                created: false,
            });
        }

        let candidate = generate_secret();
        let stored = self
            .kv
            .set_if_absent(&self.key_for(identity), candidate.as_bytes().to_vec())
            .await
            .context("Failed to persist identity secret")?;
        let secret = String::from_utf8(stored).context("Stored secret is not valid UTF-8")?;
        let created = secret == candidate;

        Ok(Issued { secret, created })
    }

    /// Check `supplied` against the secret on record for `identity`.
    ///
    /// Returns false when no secret has been issued.
    pub async fn verify(&self, identity: &str, supplied: &str) -> Result<bool> {
        Ok(match self.get(identity).await? {
            Some(stored) => secure_compare(stored.as_bytes(), supplied.as_bytes()),
            None => false,
        })
    }
}

/// Generate a fresh secret: [`SECRET_BYTES`] random bytes, hex encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time byte comparison.
///
/// Runtime depends only on the lengths, never on where the inputs differ.
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
