//! In-memory filesystem for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fs::{DirEntry, EntryKind, FileSystem};

/// An operation observed by [`MemoryFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    ListDir(PathBuf),
    CreateDir(PathBuf),
}

#[derive(Debug, Default)]
struct State {
    /// Nodes in insertion order, which is also the listing order.
    nodes: Vec<(PathBuf, EntryKind)>,
    ops: Vec<FsOp>,
    fail_listing: HashSet<PathBuf>,
    fail_create: HashSet<PathBuf>,
    fail_exists: HashSet<PathBuf>,
}

impl State {
    fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        self.nodes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, kind)| *kind)
    }

    fn insert(&mut self, path: &Path, kind: EntryKind) {
        let mut ancestors: Vec<&Path> = path
            .ancestors()
            .skip(1)
            .filter(|a| a.parent().is_some() && !a.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        for dir in ancestors {
            if self.kind_of(dir).is_none() {
                self.nodes.push((dir.to_path_buf(), EntryKind::Directory));
            }
        }
        if self.kind_of(path).is_none() {
            self.nodes.push((path.to_path_buf(), kind));
        }
    }
}

/// In-memory implementation of the FileSystem trait.
///
/// Listings come back in insertion order rather than sorted, which lets tests
/// check that callers impose their own ordering. Adding a path adds its
/// missing ancestors as directories. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<RwLock<State>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and its missing ancestors.
    pub async fn add_dir(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .insert(path.as_ref(), EntryKind::Directory);
    }

    /// Add a file and its missing ancestor directories.
    pub async fn add_file(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .insert(path.as_ref(), EntryKind::File);
    }

    /// Whether the path is present.
    pub async fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.state.read().await.kind_of(path.as_ref()).is_some()
    }

    /// Make listing `path` fail with a permission error.
    pub async fn fail_listing(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .fail_listing
            .insert(path.as_ref().to_path_buf());
    }

    /// Make creating `path` fail with a permission error.
    pub async fn fail_create(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .fail_create
            .insert(path.as_ref().to_path_buf());
    }

    /// Make checking whether `path` exists fail with a permission error.
    pub async fn fail_exists(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .fail_exists
            .insert(path.as_ref().to_path_buf());
    }

    /// All observed operations, in order.
    pub async fn ops(&self) -> Vec<FsOp> {
        self.state.read().await.ops.clone()
    }

    /// Directories passed to `create_dir_all`, in order.
    pub async fn created_dirs(&self) -> Vec<PathBuf> {
        self.state
            .read()
            .await
            .ops
            .iter()
            .filter_map(|op| match op {
                FsOp::CreateDir(path) => Some(path.clone()),
                FsOp::ListDir(_) => None,
            })
            .collect()
    }
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut state = self.state.write().await;
        state.ops.push(FsOp::ListDir(dir.to_path_buf()));

        if state.fail_listing.contains(dir) {
            return Err(permission_denied(dir));
        }
        if state.kind_of(dir) != Some(EntryKind::Directory) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }

        Ok(state
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .filter_map(|(path, kind)| {
                path.file_name().map(|name| DirEntry {
                    name: name.to_os_string(),
                    kind: *kind,
                })
            })
            .collect())
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let state = self.state.read().await;
        if state.fail_exists.contains(path) {
            return Err(permission_denied(path));
        }
        Ok(state.kind_of(path).is_some())
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        let mut state = self.state.write().await;
        state.ops.push(FsOp::CreateDir(dir.to_path_buf()));

        if state.fail_create.contains(dir) {
            return Err(permission_denied(dir));
        }
        if state.kind_of(dir) == Some(EntryKind::File) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", dir.display()),
            ));
        }

        state.insert(dir, EntryKind::Directory);
        Ok(())
    }
}
