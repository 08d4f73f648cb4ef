//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the converter and filesystem
//! traits, allowing the tree walk to be tested without ffmpeg or real media.
//!
//! # Example
//!
//! ```rust,ignore
//! use audio_mirror_core::testing::{MemoryFs, MockConverter};
//!
//! let fs = MemoryFs::new();
//! fs.add_file("/in/sub/clip.mp4").await;
//! fs.add_dir("/out").await;
//!
//! let converter = MockConverter::new();
//! let tree = TreeConverter::new(converter.clone(), fs.clone(), AudioFormat::Mp3);
//! tree.convert_tree(Path::new("/in"), Path::new("/out")).await?;
//!
//! assert_eq!(converter.conversion_count().await, 1);
//! ```

mod memory_fs;
mod mock_converter;

pub use memory_fs::{FsOp, MemoryFs};
pub use mock_converter::{MockConverter, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io;
    use std::path::Path;

    /// Create empty files (and their parent directories) under `root`.
    pub fn create_files(root: &Path, files: &[&str]) -> io::Result<()> {
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, b"")?;
        }
        Ok(())
    }

    /// Create directories under `root`.
    pub fn create_dirs(root: &Path, dirs: &[&str]) -> io::Result<()> {
        for dir in dirs {
            std::fs::create_dir_all(root.join(dir))?;
        }
        Ok(())
    }
}
