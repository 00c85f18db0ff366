use std::io;
use std::sync::{Arc, RwLock};

use crate::error::{Result, SurveyError};

use super::store::SnapshotStore;

/// In-memory snapshot store backed by `Arc<RwLock<Option<Vec<u8>>>>`.
///
/// Clone-friendly (cloning shares the same underlying slot).
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    slot: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored bytes directly, e.g. to simulate a corrupt backup.
    pub fn put(&self, bytes: Vec<u8>) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| SurveyError::LockPoisoned("snapshot write"))?;
        *slot = Some(bytes);
        Ok(())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&self, bytes: &[u8]) -> Result<()> {
        self.put(bytes.to_vec())
    }

    fn load(&self) -> Result<Vec<u8>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| SurveyError::LockPoisoned("snapshot read"))?;
        slot.clone().ok_or_else(|| {
            SurveyError::StorageIo(io::Error::new(
                io::ErrorKind::NotFound,
                "no snapshot has been saved",
            ))
        })
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
