//! FileSnapshotStore - snapshot bytes in a single file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::store::SnapshotStore;

/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash mid-write never leaves a truncated backup behind.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, bytes)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
