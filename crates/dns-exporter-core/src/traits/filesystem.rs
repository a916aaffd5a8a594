// # Filesystem Trait
//
// The export orchestrator never touches `std::fs` directly. Everything it
// writes goes through this trait so the export tree can live on disk
// (`fs::OsFilesystem`) or in memory (`fs::MemoryFilesystem`).

use async_trait::async_trait;
use std::path::Path;

/// Trait for the storage the export tree is written to
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Check whether a directory exists at `path`
    async fn dir_exists(&self, path: &Path) -> Result<bool, crate::Error>;

    /// Create a directory and all of its missing parents
    async fn create_dir_all(&self, path: &Path) -> Result<(), crate::Error>;

    /// Create or truncate the file at `path` and write `contents` to it
    ///
    /// The data must be flushed before this returns.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), crate::Error>;
}
