pub mod config;
pub mod converter;
pub mod fs;
pub mod testing;
pub mod walker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ENV_PREFIX,
};
pub use converter::{
    AudioFormat, ConversionJob, ConversionProgress, ConversionResult, Converter, ConverterConfig,
    ConverterError, FfmpegConverter,
};
pub use fs::{DirEntry, EntryKind, FileSystem, LocalFs};
pub use walker::{TreeConverter, WalkError, WalkSummary};
