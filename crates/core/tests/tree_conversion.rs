//! Tree conversion integration tests.
//!
//! These tests run the tree walk against a real temporary directory with the
//! mock converter standing in for ffmpeg:
//! - Directory mirroring and output naming
//! - Skip-if-exists and re-run behaviour
//! - Abort on the first failed conversion, then resume

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use audio_mirror_core::{
    testing::{fixtures, MockConverter},
    AudioFormat, LocalFs, TreeConverter, WalkError,
};

/// Test helper holding the input and output roots.
struct TestHarness {
    _temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
    converter: MockConverter,
}

impl TestHarness {
    async fn new(files: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        std::fs::create_dir_all(&input).expect("Failed to create input dir");
        std::fs::create_dir_all(&output).expect("Failed to create output dir");
        fixtures::create_files(&input, files).expect("Failed to create input files");

        let converter = MockConverter::new();
        converter.set_write_outputs(true).await;

        Self {
            _temp_dir: temp_dir,
            input,
            output,
            converter,
        }
    }

    fn tree(&self, format: AudioFormat) -> TreeConverter<MockConverter, LocalFs> {
        TreeConverter::new(self.converter.clone(), LocalFs, format)
    }

    fn out(&self, relative: &str) -> PathBuf {
        self.output.join(relative)
    }

    fn src(&self, relative: &str) -> PathBuf {
        self.input.join(relative)
    }
}

#[tokio::test]
async fn test_mirrors_subdirectory_before_sibling_file() {
    let h = TestHarness::new(&["sub/clip.mp4", "other.mp4"]).await;

    let summary = assert_ok!(h.tree(AudioFormat::Mp3).convert_tree(&h.input, &h.output).await);

    assert!(h.out("sub").is_dir());
    assert_eq!(summary.directories_created, 1);
    assert_eq!(summary.converted, 2);

    let recorded = h.converter.recorded_conversions().await;
    let pairs: Vec<(PathBuf, PathBuf)> = recorded
        .iter()
        .map(|c| (c.job.source_path.clone(), c.job.output_path.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (h.src("sub/clip.mp4"), h.out("sub/clip.mp3")),
            (h.src("other.mp4"), h.out("other.mp3")),
        ]
    );
    assert!(recorded.iter().all(|c| c.job.format == AudioFormat::Mp3));
}

#[tokio::test]
async fn test_existing_output_is_left_alone() {
    let h = TestHarness::new(&["sub/clip.mp4", "other.mp4"]).await;
    fixtures::create_dirs(&h.output, &["sub"]).unwrap();
    std::fs::write(h.out("sub/clip.mp3"), b"already converted").unwrap();

    let summary = assert_ok!(h.tree(AudioFormat::Mp3).convert_tree(&h.input, &h.output).await);

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.converted, 1);
    assert_eq!(
        h.converter.converted_sources().await,
        vec![h.src("other.mp4")]
    );
    assert_eq!(
        std::fs::read(h.out("sub/clip.mp3")).unwrap(),
        b"already converted"
    );
}

#[tokio::test]
async fn test_second_run_converts_nothing() {
    let h = TestHarness::new(&["a/1.mkv", "a/b/2.mkv", "3.mkv", "c/4.mkv"]).await;
    let tree = h.tree(AudioFormat::Ogg);

    let first = assert_ok!(tree.convert_tree(&h.input, &h.output).await);
    assert_eq!(first.converted, 4);

    h.converter.clear_recorded().await;
    let second = assert_ok!(tree.convert_tree(&h.input, &h.output).await);

    assert_eq!(h.converter.conversion_count().await, 0);
    assert_eq!(second.converted, 0);
    assert_eq!(second.skipped, 4);
    assert_eq!(second.directories_created, 0);
}

#[tokio::test]
async fn test_output_names_strip_final_extension_only() {
    let h = TestHarness::new(&["movie.mkv", "archive.tar.gz", "README"]).await;

    assert_ok!(h.tree(AudioFormat::Ogg).convert_tree(&h.input, &h.output).await);

    assert!(h.out("movie.ogg").is_file());
    assert!(h.out("archive.tar.ogg").is_file());
    assert!(h.out("README.ogg").is_file());
}

#[tokio::test]
async fn test_empty_directories_are_mirrored() {
    let h = TestHarness::new(&[]).await;
    fixtures::create_dirs(&h.input, &["empty/nested"]).unwrap();

    let summary = assert_ok!(h.tree(AudioFormat::Wav).convert_tree(&h.input, &h.output).await);

    assert!(h.out("empty/nested").is_dir());
    assert_eq!(summary.directories_created, 2);
    assert_eq!(summary.files(), 0);
}

#[tokio::test]
async fn test_failure_stops_walk_and_rerun_resumes() {
    let h = TestHarness::new(&["a.mp4", "b.mp4", "c.mp4"]).await;
    h.converter.fail_on(h.src("b.mp4"), "Invalid data found when processing input").await;
    let tree = h.tree(AudioFormat::Aac);

    let err = assert_err!(tree.convert_tree(&h.input, &h.output).await);
    assert!(matches!(err, WalkError::Conversion { ref path, .. } if path == &h.src("b.mp4")));
    assert_eq!(
        h.converter.attempted_sources().await,
        vec![h.src("a.mp4"), h.src("b.mp4")]
    );
    assert!(h.out("a.aac").is_file());
    assert!(!h.out("c.aac").exists());

    h.converter.clear_failures().await;
    h.converter.clear_recorded().await;

    let summary = assert_ok!(tree.convert_tree(&h.input, &h.output).await);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        h.converter.converted_sources().await,
        vec![h.src("b.mp4"), h.src("c.mp4")]
    );
}

#[tokio::test]
async fn test_run_creates_missing_output_root() {
    let h = TestHarness::new(&["x.webm"]).await;
    let output = h.out("nested/root");

    let summary = assert_ok!(h.tree(AudioFormat::Flac).run(&h.input, &output).await);

    assert_eq!(summary.converted, 1);
    assert!(output.join("x.flac").is_file());
}

#[tokio::test]
async fn test_missing_input_root_is_a_filesystem_error() {
    let h = TestHarness::new(&[]).await;
    let missing = h.src("does-not-exist");

    let err = assert_err!(h.tree(AudioFormat::Mp3).convert_tree(&missing, &h.output).await);

    assert!(matches!(err, WalkError::ListDir { .. }));
    assert_eq!(err.path(), &missing);
}

#[tokio::test]
async fn test_unicode_and_spaces_in_names() {
    let h = TestHarness::new(&["Épisode 01.mkv", "season two/ep 1.mkv"]).await;

    assert_ok!(h.tree(AudioFormat::Mp3).convert_tree(&h.input, &h.output).await);

    assert!(Path::new(&h.out("Épisode 01.mp3")).is_file());
    assert!(h.out("season two/ep 1.mp3").is_file());
}
