//! Types for the walker module.

use serde::Serialize;

/// Counts collected over one tree conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Files handed to the converter that completed successfully.
    pub converted: usize,
    /// Files whose output already existed.
    pub skipped: usize,
    /// Mirrored directories created below the output root.
    pub directories_created: usize,
}

impl WalkSummary {
    /// Total number of files visited.
    pub fn files(&self) -> usize {
        self.converted + self.skipped
    }
}
