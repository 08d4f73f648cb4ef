//! Converter module for extracting audio from video files.
//!
//! This module provides the `Converter` trait and an FFmpeg implementation that
//! reads a video, keeps only its audio stream, and encodes it with the codec
//! mapped to the requested [`AudioFormat`].
//!
//! # Example
//!
//! ```ignore
//! use audio_mirror_core::converter::{AudioFormat, ConversionJob, Converter, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob::new(
//!     PathBuf::from("/videos/clip.mov"),
//!     PathBuf::from("/audio/clip.mp3"),
//!     AudioFormat::Mp3,
//! );
//!
//! let result = converter.convert(job).await?;
//! println!("Converted in {} ms", result.duration_ms);
//! ```

pub mod codec;
mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{AudioFormat, ConversionJob, ConversionProgress, ConversionResult, UnknownFormat};
