//! Filesystem access used by the tree walk.
//!
//! The walk only needs three primitives: list a directory with file/directory
//! discrimination, test whether a path exists, and create a directory with its
//! missing parents. [`LocalFs`] provides them on top of `tokio::fs`; tests use
//! [`crate::testing::MemoryFs`].

mod local;
mod traits;
mod types;

pub use local::LocalFs;
pub use traits::FileSystem;
pub use types::{DirEntry, EntryKind};
