//! Local filesystem implementation.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

use super::traits::FileSystem;
use super::types::{DirEntry, EntryKind};

/// [`FileSystem`] backed by `tokio::fs`.
///
/// Symlinks are not followed when classifying entries, so a link to a
/// directory is treated as a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut reader = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let kind = if entry.file_type().await?.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry {
                name: entry.file_name(),
                kind,
            });
        }

        Ok(entries)
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        fs::try_exists(path).await
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir).await
    }
}
