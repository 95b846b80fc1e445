//! Settings store: one binary blob per authenticated user.
//!
//! Records live under `settings:<derive(settings_pepper, identity)>` and are
//! always replaced as a whole. The `written` timestamp doubles as the
//! version marker surfaced to clients as an ETag.

mod record;

pub use record::SettingsRecord;

use crate::auth::AuthenticatedUser;
use crate::hasher::{derive, KeyNamespace, Pepper};
use crate::kv::SharedKvStore;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, warn};


/// Content type accepted by [`SettingsStore::write`].
pub const SETTINGS_CONTENT_TYPE: &str = "application/octet-stream";

/// Write failures
#[derive(Debug)]
pub enum WriteError {
    /// Caller's content type is not `application/octet-stream`
    UnsupportedMediaType(Option<String>),
    /// Payload exceeds the configured limit
    PayloadTooLarge { limit: usize },
    /// Backing store failure
    Store(anyhow::Error),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::UnsupportedMediaType(Some(ct)) => {
                write!(f, "Unsupported content type '{}', expected {}", ct, SETTINGS_CONTENT_TYPE)
            }
            WriteError::UnsupportedMediaType(None) => {
                write!(f, "Missing content type, expected {}", SETTINGS_CONTENT_TYPE)
            }
            WriteError::PayloadTooLarge { limit } => {
                write!(f, "Payload too large (limit is {} bytes)", limit)
            }
            WriteError::Store(e) => write!(f, "Failed to store settings: {}", e),
        }
    }
}

impl std::error::Error for WriteError {}

/// Version marker returned by `peek` and `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Written {
    pub written: i64,
}

/// Durable per-user settings storage.
#[derive(Clone)]
pub struct SettingsStore {
    kv: SharedKvStore,
    pepper: Pepper,
    max_bytes: usize,
}

impl SettingsStore {
    pub fn new(kv: SharedKvStore, pepper: Pepper, max_bytes: usize) -> Self {
        Self {
            kv,
            pepper,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn key_for(&self, user: &AuthenticatedUser) -> String {
        derive(&self.pepper, user.identity()).in_namespace(KeyNamespace::Settings)
    }

    /// Full record, from a single read of the backing store.
    pub async fn read(&self, user: &AuthenticatedUser) -> Result<Option<SettingsRecord>> {
        let raw = self
            .kv
            .get(&self.key_for(user))
            .await
            .context("Failed to read settings")?;
        raw.map(|bytes| SettingsRecord::decode(&bytes)).transpose()
    }

    /// Version marker only; the payload is not returned to the caller.
    pub async fn peek(&self, user: &AuthenticatedUser) -> Result<Option<Written>> {
        let raw = self
            .kv
            .get(&self.key_for(user))
            .await
            .context("Failed to read settings")?;
        raw.map(|bytes| SettingsRecord::decode_written(&bytes).map(|written| Written { written }))
            .transpose()
    }

    /// Replace the user's record with `value`.
    ///
    /// Last writer wins; there is no check against the version the caller
    /// last observed.
    pub async fn write(
        &self,
        user: &AuthenticatedUser,
        content_type: Option<&str>,
        value: Vec<u8>,
    ) -> Result<Written, WriteError> {
        if !is_settings_content_type(content_type) {
            return Err(WriteError::UnsupportedMediaType(
                content_type.map(|ct| ct.to_string()),
            ));
        }
        if value.len() > self.max_bytes {
            return Err(WriteError::PayloadTooLarge {
                limit: self.max_bytes,
            });
        }

        let key = self.key_for(user);
        let raw = self
            .kv
            .get(&key)
            .await
            .context("Failed to read settings")
            .map_err(WriteError::Store)?;
        // An undecodable record is overwritten like any other.
        let previous = raw.and_then(|bytes| match SettingsRecord::decode_written(&bytes) {
            Ok(written) => Some(written),
            Err(e) => {
                warn!(key = %key, error = %e, "Replacing undecodable settings record");
                None
            }
        });
        let written = next_written(Utc::now().timestamp_millis(), previous);

        let record = SettingsRecord { value, written };
        let encoded = record.encode().map_err(WriteError::Store)?;
        self.kv
            .set(&key, encoded)
            .await
            .context("Failed to write settings")
            .map_err(WriteError::Store)?;

        debug!(key = %key, bytes = record.value.len(), written, "Settings written");
        Ok(Written { written })
    }

    /// Remove the user's record. Succeeds whether or not one exists.
    pub async fn delete(&self, user: &AuthenticatedUser) -> Result<()> {
        self.kv
            .delete(&self.key_for(user))
            .await
            .context("Failed to delete settings")
    }
}

/// True for `application/octet-stream`, ignoring case and parameters.
pub fn is_settings_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(SETTINGS_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Next version marker: wall-clock milliseconds, bumped past the previous
/// marker if the clock has not advanced.
pub fn next_written(now_ms: i64, previous: Option<i64>) -> i64 {
    match previous {
        Some(prev) if now_ms <= prev => prev + 1,
        _ => now_ms,
    }
}
