//! Service configuration, loadable from TOML.
//!
//! ```toml
//! snapshot_path = "Resources/Backups/backup.json"
//! snapshot_format = "json"
//! eligible_response_types = ["post"]
//! ```
//!
//! Every key is optional; missing keys fall back to [`SurveyConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregation::EligibleTypes;
use crate::error::{Result, SurveyError};
use crate::snapshot::SnapshotCodec;

pub const DEFAULT_SNAPSHOT_PATH: &str = "Resources/Backups/backup.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Where `backup`/`restore` read and write when using the file store.
    pub snapshot_path: PathBuf,
    pub snapshot_format: SnapshotCodec,
    /// Response types counted by the aggregation cache.
    pub eligible_response_types: EligibleTypes,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            snapshot_format: SnapshotCodec::default(),
            eligible_response_types: EligibleTypes::default(),
        }
    }
}

impl SurveyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SurveyError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SurveyError::Config(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}
