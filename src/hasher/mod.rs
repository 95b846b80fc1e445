//! Storage key derivation.
//!
//! Every key written to the backing store is `sha256(pepper || identity)`,
//! hex encoded and prefixed with its namespace. The secrets and settings
//! namespaces use independent peppers, so a key in one cannot be linked to
//! a key in the other without knowing both.

use sha2::{Digest, Sha256};
use std::fmt;

/// Server-held secret mixed into every derived key.
#[derive(Clone, PartialEq, Eq)]
pub struct Pepper(String);

impl Pepper {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

// Never print pepper material.
impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pepper(***)")
    }
}

/// Logical partition of the shared key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNamespace {
    Secrets,
    Settings,
}

impl KeyNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyNamespace::Secrets => "secrets",
            KeyNamespace::Settings => "settings",
        }
    }
}

/// Hex-encoded digest of `pepper || identity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Full key as written to the backing store, e.g. `settings:<hex>`.
    pub fn in_namespace(&self, namespace: KeyNamespace) -> String {
        format!("{}:{}", namespace.prefix(), self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the storage key for `identity` under `pepper`.
pub fn derive(pepper: &Pepper, identity: &str) -> StorageKey {
    let mut hasher = Sha256::new();
    hasher.update(pepper.as_bytes());
    hasher.update(identity.as_bytes());
    StorageKey(hex::encode(hasher.finalize()))
}
