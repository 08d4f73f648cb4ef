//! Command-line arguments.

use std::path::{Path, PathBuf};

use audio_mirror_core::{AudioFormat, Config};
use clap::Parser;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "audio-mirror.toml";

/// Mirror a directory of videos into a directory of extracted audio files.
#[derive(Debug, Parser)]
#[command(name = "audio-mirror", version)]
pub struct Cli {
    /// Root of the video tree to read
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Root of the audio tree to write (created if missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output audio format: mp3, aac, ogg, wav or flac
    #[arg(short, long)]
    pub format: Option<AudioFormat>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "AUDIO_MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The config file to load, if any.
    ///
    /// An explicit `--config` is always returned, so a missing file is reported.
    /// The default file is only used when it exists.
    pub fn config_path(&self, cwd: &Path) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        }
    }

    /// Applies flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref input) = self.input {
            config.input_dir = input.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(ref ffmpeg) = self.ffmpeg {
            config.converter.ffmpeg_path = ffmpeg.clone();
        }
        if let Some(ref ffprobe) = self.ffprobe {
            config.converter.ffprobe_path = ffprobe.clone();
        }
    }

    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
