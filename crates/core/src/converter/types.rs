//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::codec;

/// Audio output format, selected once for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG Audio Layer III
    #[default]
    Mp3,
    /// Advanced Audio Coding
    Aac,
    /// Ogg Vorbis
    Ogg,
    /// WAVE (uncompressed PCM)
    Wav,
    /// Free Lossless Audio Codec
    Flac,
}

impl AudioFormat {
    /// All supported formats, in declaration order.
    pub const ALL: [AudioFormat; 5] = [Self::Mp3, Self::Aac, Self::Ogg, Self::Wav, Self::Flac];

    /// Returns the lowercase name, which doubles as the output file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Returns the ffmpeg codec name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        codec::resolve(self.as_str())
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported audio format '{0}' (expected one of: mp3, aac, ogg, wav, flac)")]
pub struct UnknownFormat(pub String);

impl FromStr for AudioFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// A single conversion request: one source video, one audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Input video file path.
    pub source_path: PathBuf,
    /// Output audio file path.
    pub output_path: PathBuf,
    /// Target audio format.
    pub format: AudioFormat,
}

impl ConversionJob {
    pub fn new(source_path: PathBuf, output_path: PathBuf, format: AudioFormat) -> Self {
        Self {
            source_path,
            output_path,
            format,
        }
    }

    /// Base name of the source file, used in log lines.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
    /// Output format used.
    pub format: AudioFormat,
}

/// Progress update during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Progress percentage (0.0 - 100.0), absent when the input duration is unknown.
    pub percent: Option<f32>,
    /// Current processing time in seconds.
    pub time_secs: f64,
    /// Current processing speed (e.g., "1.5x").
    pub speed: Option<String>,
}

impl ConversionProgress {
    /// Formats the percentage for log output.
    pub fn percent_display(&self) -> String {
        match self.percent {
            Some(p) => format!("{:.1}", p),
            None => "?".to_string(),
        }
    }
}
