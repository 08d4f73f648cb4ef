//! Trait definitions for the fs module.

use async_trait::async_trait;
use std::io;
use std::path::Path;

use super::types::DirEntry;

/// The filesystem operations the tree walk depends on.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Lists the direct children of `dir`, in no particular order.
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;

    /// Returns whether `path` exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Creates `dir` and any missing parents.
    async fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
}
