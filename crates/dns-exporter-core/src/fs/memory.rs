// # Memory Filesystem
//
// In-memory implementation of Filesystem.
//
// Directories and files live in ordered maps behind a RwLock. Writing a file
// requires its parent directory to exist, as it would on disk, so layout
// mistakes surface in tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::Filesystem;

#[derive(Debug, Default)]
struct Tree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

/// In-memory filesystem
///
/// Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<Tree>>,
}

impl MemoryFilesystem {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file back
    pub async fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.inner.read().await.files.get(path).cloned()
    }

    /// Read a file back as UTF-8 text
    pub async fn read_to_string(&self, path: &Path) -> Option<String> {
        self.read_file(path)
            .await
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// All file paths, sorted
    pub async fn files(&self) -> Vec<PathBuf> {
        self.inner.read().await.files.keys().cloned().collect()
    }
}

#[async_trait]
impl Filesystem for MemoryFilesystem {
    async fn dir_exists(&self, path: &Path) -> Result<bool, Error> {
        Ok(self.inner.read().await.dirs.contains(path))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        let mut tree = self.inner.write().await;
        if tree.files.contains_key(path) {
            return Err(Error::filesystem(format!(
                "Failed to create directory {}: a file exists at that path",
                path.display()
            )));
        }
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            tree.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), Error> {
        let mut tree = self.inner.write().await;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !tree.dirs.contains(parent)
        {
            return Err(Error::filesystem(format!(
                "Failed to create file {}: parent directory does not exist",
                path.display()
            )));
        }
        tree.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
