//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionProgress, ConversionResult};

/// A transcoding engine that extracts the audio stream of a media file.
///
/// A call settles exactly once: `Ok` is the end event, `Err` is the error event.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts a media file as described by the job.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Converts a media file with progress reporting.
    ///
    /// The progress sender will receive updates during conversion and is dropped
    /// before the call returns. If the receiver is dropped, conversion continues
    /// without progress reporting.
    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AudioFormat;
    use std::path::PathBuf;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
            Ok(ConversionResult {
                output_path: job.output_path,
                output_size_bytes: 512,
                duration_ms: 1000,
                format: job.format,
            })
        }

        async fn convert_with_progress(
            &self,
            job: ConversionJob,
            _progress_tx: mpsc::Sender<ConversionProgress>,
        ) -> Result<ConversionResult, ConverterError> {
            self.convert(job).await
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_converter_as_trait_object() {
        let converter: Box<dyn Converter> = Box::new(EchoConverter);
        let job = ConversionJob::new(
            PathBuf::from("/test/input.mkv"),
            PathBuf::from("/test/input.ogg"),
            AudioFormat::Ogg,
        );
        let result = converter.convert(job).await.unwrap();
        assert_eq!(result.output_path, PathBuf::from("/test/input.ogg"));
        assert_eq!(result.format, AudioFormat::Ogg);
        assert_eq!(converter.name(), "echo");
    }
}
