use std::path::Path;

use crate::error::TransferError;

pub mod sqlite;

/// File transfer and version probe primitives behind backup and restore jobs.
///
/// Implementations are synchronous and must only be called from a
/// background context.
pub trait DbTransfer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Replace `to` with a byte-for-byte copy of `from`.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64, TransferError>;

    /// Read the embedded schema version without modifying the file.
    fn read_version(&self, database: &Path) -> Result<i32, TransferError>;

    /// Probe both files, closing each before comparing.
    fn versions_match(&self, backup: &Path, live: &Path) -> Result<bool, TransferError> {
        let backup_version = self.read_version(backup)?;
        let live_version = self.read_version(live)?;
        tracing::debug!(backup_version, live_version, "probed database versions");
        Ok(backup_version == live_version)
    }
}
