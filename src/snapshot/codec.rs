//! Snapshot serialization: JSON (human-readable backups) and bitcode (compact).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

use super::Snapshot;

/// Bumped whenever the envelope or snapshot layout changes incompatibly.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    snapshot: Snapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotCodec {
    #[default]
    Json,
    #[cfg(feature = "bitcode")]
    Bitcode,
}

impl SnapshotCodec {
    pub fn serialize(&self, snapshot: &Snapshot) -> Result<Vec<u8>> {
        let envelope = EnvelopeRef {
            format_version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
        };
        match self {
            SnapshotCodec::Json => serde_json::to_vec_pretty(&envelope)
                .map_err(|e| SurveyError::Serialization(format!("json encode: {e}"))),
            #[cfg(feature = "bitcode")]
            SnapshotCodec::Bitcode => bitcode::serialize(&envelope)
                .map_err(|e| SurveyError::Serialization(format!("bitcode encode: {e}"))),
        }
    }

    /// Decode bytes produced by [`serialize`](Self::serialize) with the same codec.
    ///
    /// Malformed bytes and unknown format versions are both `Serialization` errors.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Snapshot> {
        let envelope: Envelope = match self {
            SnapshotCodec::Json => serde_json::from_slice(bytes)
                .map_err(|e| SurveyError::Serialization(format!("json decode: {e}")))?,
            #[cfg(feature = "bitcode")]
            SnapshotCodec::Bitcode => bitcode::deserialize(bytes)
                .map_err(|e| SurveyError::Serialization(format!("bitcode decode: {e}")))?,
        };

        if envelope.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SurveyError::Serialization(format!(
                "unsupported snapshot format version {} (expected {})",
                envelope.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        Ok(envelope.snapshot)
    }
}
