//! Snapshots - whole-state backup and restore.
//!
//! A [`Snapshot`] captures the full catalog and response set at one instant.
//! [`SnapshotCodec`] turns it into bytes inside a versioned envelope, and a
//! [`SnapshotStore`] persists those bytes. Snapshots are never diffed: a
//! restore always replaces everything.

mod codec;
mod file;
mod in_memory;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Survey;
use crate::response::SurveyResponse;

pub use codec::{SnapshotCodec, SNAPSHOT_FORMAT_VERSION};
pub use file::FileSnapshotStore;
pub use in_memory::InMemorySnapshotStore;
pub use store::SnapshotStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub surveys: Vec<Survey>,
    pub responses: Vec<SurveyResponse>,
}

impl Snapshot {
    pub fn new(surveys: Vec<Survey>, responses: Vec<SurveyResponse>) -> Self {
        Self {
            taken_at: Utc::now(),
            surveys,
            responses,
        }
    }
}
