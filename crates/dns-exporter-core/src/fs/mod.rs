// # Filesystem Implementations
//
// This module provides implementations of the Filesystem trait for
// different storage backends.

pub mod memory;
pub mod os;

pub use memory::MemoryFilesystem;
pub use os::OsFilesystem;

use std::path::Path;

use crate::Result;
use crate::traits::Filesystem;

/// Ensure a directory exists, optionally creating it
///
/// Returns whether the directory already existed before the call.
pub async fn ensure_dir(fs: &dyn Filesystem, path: &Path, create: bool) -> Result<bool> {
    if fs.dir_exists(path).await? {
        return Ok(true);
    }
    if create {
        fs.create_dir_all(path).await?;
        tracing::debug!("Created directory {}", path.display());
    }
    Ok(false)
}
