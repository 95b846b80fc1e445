use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// A user's settings blob and the time it was written (ms since epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
    pub written: i64,
}

impl SettingsRecord {
    /// Serialized form stored in the backing store: `{"value": "<base64>", "written": <ms>}`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("Failed to encode settings record")
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to decode settings record")
    }

    /// Reads only the `written` field; the payload is skipped, not decoded.
    pub fn decode_written(bytes: &[u8]) -> Result<i64> {
        serde_json::from_slice::<RecordVersion>(bytes)
            .map(|v| v.written)
            .context("Failed to decode settings record version")
    }
}

#[derive(Deserialize)]
struct RecordVersion {
    written: i64,
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
