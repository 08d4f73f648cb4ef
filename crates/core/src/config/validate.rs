use std::io;
use std::path::{Component, Path, PathBuf};

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Input directory exists and is a directory
/// - Output directory is neither the input directory nor inside it
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.input_dir.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "input_dir {} is not a directory",
            config.input_dir.display()
        )));
    }

    let input = resolve(&config.input_dir).map_err(|e| {
        ConfigError::ValidationError(format!(
            "cannot resolve input_dir {}: {}",
            config.input_dir.display(),
            e
        ))
    })?;
    let output = resolve(&config.output_dir).map_err(|e| {
        ConfigError::ValidationError(format!(
            "cannot resolve output_dir {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    // The walk would otherwise descend into its own output
    if output.starts_with(&input) {
        return Err(ConfigError::ValidationError(format!(
            "output_dir {} must not be inside input_dir {}",
            config.output_dir.display(),
            config.input_dir.display()
        )));
    }

    Ok(())
}

/// Removes `.` and `..` segments without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Canonicalizes the longest existing prefix of `path` and appends the rest.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = normalize(&std::path::absolute(path)?);
    let mut missing = Vec::new();
    let mut current = absolute.as_path();

    loop {
        if current.exists() {
            let mut resolved = current.canonicalize()?;
            resolved.extend(missing.iter().rev());
            return Ok(resolved);
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return Ok(absolute),
        }
    }
}
