//! Tree walker that mirrors a video tree into an audio tree.
//!
//! For every directory under the input root a same-named directory is created
//! under the output root. For every file, `<stem>.<format>` is produced in the
//! mirrored directory unless it already exists.
//!
//! # Example
//!
//! ```ignore
//! use audio_mirror_core::{AudioFormat, FfmpegConverter, LocalFs, TreeConverter};
//!
//! let tree = TreeConverter::new(FfmpegConverter::with_defaults(), LocalFs, AudioFormat::Mp3);
//! let summary = tree.run(Path::new("./video-input"), Path::new("./audio-output")).await?;
//! println!("{} converted, {} skipped", summary.converted, summary.skipped);
//! ```

mod error;
mod naming;
mod tree;
mod types;

pub use error::WalkError;
pub use naming::{compare_names, sort_entries, target_file_name};
pub use tree::TreeConverter;
pub use types::WalkSummary;
