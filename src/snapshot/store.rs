use crate::error::Result;

/// Persistence for encoded snapshot bytes. One slot per store (latest wins).
pub trait SnapshotStore: Send + Sync {
    /// Save (or overwrite) the snapshot bytes.
    fn save(&self, bytes: &[u8]) -> Result<()>;

    /// Load the latest snapshot bytes.
    fn load(&self) -> Result<Vec<u8>>;

    /// Human-readable description of where snapshots live, for logs.
    fn location(&self) -> String;
}
