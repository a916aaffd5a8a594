// # OS Filesystem
//
// tokio::fs backed implementation of Filesystem.
//
// ## Writes
//
// Zonefiles are written to a sibling temporary file, flushed, then renamed
// over the destination. A reader (or a commit) never sees a half-written
// zonefile.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::Filesystem;

/// Filesystem backed by the local disk
///
/// # Example
///
/// ```rust,no_run
/// use dns_exporter_core::fs::OsFilesystem;
/// use dns_exporter_core::traits::Filesystem;
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fs = OsFilesystem::new();
///     fs.create_dir_all(Path::new("./data/CloudFlare")).await?;
///     fs.write_file(Path::new("./data/CloudFlare/example-com.txt"), b";; SOA Record\n").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl OsFilesystem {
    /// Create a new OS filesystem handle
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = std::ffi::OsString::from(".");
        name.push(path.file_name().unwrap_or_default());
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait]
impl Filesystem for OsFilesystem {
    async fn dir_exists(&self, path: &Path) -> Result<bool, Error> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::filesystem(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        fs::create_dir_all(path).await.map_err(|e| {
            Error::filesystem(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), Error> {
        let temp_path = Self::temp_path(path);
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::filesystem(format!(
                    "Failed to create file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(contents).await.map_err(|e| {
                Error::filesystem(format!(
                    "Failed to write to file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::filesystem(format!(
                    "Failed to flush file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::filesystem(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}
