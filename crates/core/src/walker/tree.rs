//! Recursive tree conversion.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::converter::{AudioFormat, ConversionJob, ConversionProgress, Converter};
use crate::fs::FileSystem;

use super::error::WalkError;
use super::naming::{sort_entries, target_file_name};
use super::types::WalkSummary;

/// Buffer size for progress updates of a single conversion.
const PROGRESS_BUFFER: usize = 32;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), WalkError>> + Send + 'a>>;

/// Mirrors an input tree into an output tree, extracting audio from every file.
///
/// Entries are visited depth-first in name order and at most one filesystem
/// call or conversion is in flight at a time. The first failure aborts the
/// walk; outputs created up to that point are kept, and a re-run skips them.
pub struct TreeConverter<C: Converter, F: FileSystem> {
    converter: C,
    fs: F,
    format: AudioFormat,
}

impl<C: Converter, F: FileSystem> TreeConverter<C, F> {
    /// Creates a tree converter producing `format` outputs.
    pub fn new(converter: C, fs: F, format: AudioFormat) -> Self {
        Self {
            converter,
            fs,
            format,
        }
    }

    /// Converts `input_root` into `output_root`, creating the output root first if needed.
    pub async fn run(&self, input_root: &Path, output_root: &Path) -> Result<WalkSummary, WalkError> {
        if !self.exists(output_root).await? {
            self.fs
                .create_dir_all(output_root)
                .await
                .map_err(|source| WalkError::CreateDir {
                    path: output_root.to_path_buf(),
                    source,
                })?;
            info!("Created output directory {}", output_root.display());
        }

        info!(
            "Converting {} into {} as {} using {}",
            input_root.display(),
            output_root.display(),
            self.format.as_str().to_uppercase(),
            self.converter.name()
        );

        let summary = self.convert_tree(input_root, output_root).await?;

        info!(
            "Finished: {} converted, {} skipped, {} directories created",
            summary.converted, summary.skipped, summary.directories_created
        );

        Ok(summary)
    }

    /// Converts every entry under `input_dir` into `output_dir`, which must exist.
    pub async fn convert_tree(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<WalkSummary, WalkError> {
        let mut summary = WalkSummary::default();
        self.walk(input_dir, output_dir, &mut summary).await?;
        Ok(summary)
    }

    fn walk<'a>(
        &'a self,
        input_dir: &'a Path,
        output_dir: &'a Path,
        summary: &'a mut WalkSummary,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let mut entries =
                self.fs
                    .list_dir(input_dir)
                    .await
                    .map_err(|source| WalkError::ListDir {
                        path: input_dir.to_path_buf(),
                        source,
                    })?;
            sort_entries(&mut entries);

            for entry in entries {
                let source_path = input_dir.join(&entry.name);

                if entry.is_dir() {
                    let target_dir = output_dir.join(&entry.name);
                    if !self.exists(&target_dir).await? {
                        self.fs.create_dir_all(&target_dir).await.map_err(|source| {
                            WalkError::CreateDir {
                                path: target_dir.clone(),
                                source,
                            }
                        })?;
                        debug!("Created directory {}", target_dir.display());
                        summary.directories_created += 1;
                    }
                    self.walk(&source_path, &target_dir, summary).await?;
                    continue;
                }

                let target_path = output_dir.join(target_file_name(&entry.name, self.format));
                if self.exists(&target_path).await? {
                    info!(
                        "File {} already exists. Skipping conversion.",
                        target_path.display()
                    );
                    summary.skipped += 1;
                    continue;
                }

                self.convert_file(ConversionJob::new(source_path, target_path, self.format))
                    .await?;
                summary.converted += 1;
            }

            Ok(())
        })
    }

    /// Runs one conversion to completion, logging its progress.
    async fn convert_file(&self, job: ConversionJob) -> Result<(), WalkError> {
        let file_name = job.file_name();
        let source_path = job.source_path.clone();

        let (progress_tx, mut progress_rx) =
            mpsc::channel::<ConversionProgress>(PROGRESS_BUFFER);
        let report = async {
            while let Some(progress) = progress_rx.recv().await {
                info!(
                    "Processing {}: {}% done",
                    file_name,
                    progress.percent_display()
                );
            }
        };

        // The converter drops its sender when it settles, which ends `report`
        let (result, ()) = tokio::join!(
            self.converter.convert_with_progress(job, progress_tx),
            report
        );

        match result {
            Ok(_) => {
                info!(
                    "Successfully converted {} to {}.",
                    file_name,
                    self.format.as_str().to_uppercase()
                );
                Ok(())
            }
            Err(e) => {
                error!("Error converting {}: {}", file_name, e.detail());
                Err(WalkError::Conversion {
                    path: source_path,
                    source: e,
                })
            }
        }
    }

    async fn exists(&self, path: &Path) -> Result<bool, WalkError> {
        self.fs
            .exists(path)
            .await
            .map_err(|source| WalkError::Exists {
                path: path.to_path_buf(),
                source,
            })
    }
}
