use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::{AudioFormat, ConverterConfig};

/// Root configuration for one run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Root of the video tree to read
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    /// Root of the audio tree to write
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Audio format for every output file
    #[serde(default)]
    pub format: AudioFormat,
    #[serde(default)]
    pub converter: ConverterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            format: AudioFormat::default(),
            converter: ConverterConfig::default(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./video-input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./audio-output")
}
