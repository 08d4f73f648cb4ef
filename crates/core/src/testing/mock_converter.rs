//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::converter::{
    ConversionJob, ConversionProgress, ConversionResult, Converter, ConverterError,
};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs, in submission order
/// - Fail the job for a given source path
/// - Emit scripted progress updates
/// - Optionally write an empty output file so re-runs see it
///
/// Clones share state, so a clone handed to the code under test can be
/// inspected afterwards.
///
/// # Example
///
/// ```rust,ignore
/// use audio_mirror_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_on("/videos/broken.mkv", "Invalid data found").await;
///
/// let tree = TreeConverter::new(converter.clone(), LocalFs, AudioFormat::Mp3);
/// tree.convert_tree(input, output).await.unwrap_err();
///
/// assert_eq!(converter.conversion_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Failure reasons by source path.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Percentages sent before each conversion settles.
    progress_steps: Arc<RwLock<Vec<Option<f32>>>>,
    /// Whether to create an empty output file on success.
    write_outputs: Arc<RwLock<bool>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            progress_steps: Arc::new(RwLock::new(vec![Some(50.0), Some(100.0)])),
            write_outputs: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Clear recorded conversions.
    pub async fn clear_recorded(&self) {
        self.conversions.write().await.clear();
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Source paths of every attempted conversion.
    pub async fn attempted_sources(&self) -> Vec<PathBuf> {
        self.conversions
            .read()
            .await
            .iter()
            .map(|c| c.job.source_path.clone())
            .collect()
    }

    /// Source paths of successful conversions.
    pub async fn converted_sources(&self) -> Vec<PathBuf> {
        self.successful(|job| job.source_path.clone()).await
    }

    /// Output paths of successful conversions.
    pub async fn converted_outputs(&self) -> Vec<PathBuf> {
        self.successful(|job| job.output_path.clone()).await
    }

    async fn successful(&self, f: impl Fn(&ConversionJob) -> PathBuf) -> Vec<PathBuf> {
        self.conversions
            .read()
            .await
            .iter()
            .filter(|c| c.success)
            .map(|c| f(&c.job))
            .collect()
    }

    /// Make conversions of `source` fail with `reason`.
    pub async fn fail_on(&self, source: impl AsRef<Path>, reason: impl Into<String>) {
        self.failures
            .write()
            .await
            .insert(source.as_ref().to_path_buf(), reason.into());
    }

    /// Remove every configured failure.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Replace the scripted progress percentages.
    pub async fn set_progress_steps(&self, steps: Vec<Option<f32>>) {
        *self.progress_steps.write().await = steps;
    }

    /// Enable or disable writing empty output files on success.
    pub async fn set_write_outputs(&self, write: bool) {
        *self.write_outputs.write().await = write;
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let failure = self.failures.read().await.get(&job.source_path).cloned();
        if let Some(reason) = failure {
            self.conversions.write().await.push(RecordedConversion {
                job,
                success: false,
            });
            return Err(ConverterError::conversion_failed(reason, None));
        }

        if *self.write_outputs.read().await {
            if let Err(e) = tokio::fs::write(&job.output_path, b"").await {
                self.conversions.write().await.push(RecordedConversion {
                    job,
                    success: false,
                });
                return Err(ConverterError::Io(e));
            }
        }

        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            success: true,
        });

        Ok(ConversionResult {
            output_path: job.output_path,
            output_size_bytes: 0,
            duration_ms: 0,
            format: job.format,
        })
    }

    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionResult, ConverterError> {
        let steps = self.progress_steps.read().await.clone();
        for (i, percent) in steps.into_iter().enumerate() {
            let _ = progress_tx
                .send(ConversionProgress {
                    percent,
                    time_secs: i as f64,
                    speed: Some("10x".to_string()),
                })
                .await;
        }
        drop(progress_tx);

        self.convert(job).await
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
