//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::debug;

use super::codec;
use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionProgress, ConversionResult};

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Builds ffmpeg arguments that keep only the audio stream.
    fn build_args(&self, input_path: &Path, output_path: &Path, codec: &str) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            // Never overwrite: existing outputs are skipped before we get here
            "-n".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            // Drop video, subtitle and data streams
            "-vn".to_string(),
            "-sn".to_string(),
            "-dn".to_string(),
            "-c:a".to_string(),
            codec.to_string(),
        ];

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Parses the container duration out of ffprobe JSON output.
    fn parse_probe_duration(output: &str) -> Result<Option<f64>, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| ConverterError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        Ok(probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| *d > 0.0))
    }

    /// Probes the input duration in seconds, if the container reports one.
    async fn probe_duration(&self, path: &Path) -> Result<Option<f64>, ConverterError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Self::parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    /// Runs the conversion with optional progress reporting.
    async fn run_conversion(
        &self,
        job: &ConversionJob,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();

        let codec = codec::resolve(job.format.as_str());
        if codec.is_empty() {
            return Err(ConverterError::InvalidCodec {
                format: job.format.to_string(),
            });
        }

        if !tokio::fs::try_exists(&job.source_path).await? {
            return Err(ConverterError::InputNotFound {
                path: job.source_path.clone(),
            });
        }

        // Without a duration, progress carries no percentage
        let duration_secs = match self.probe_duration(&job.source_path).await {
            Ok(duration) => duration,
            Err(e) => {
                debug!("Could not probe {}: {}", job.source_path.display(), e);
                None
            }
        };

        let args = self.build_args(&job.source_path, &job.output_path, codec);
        debug!("Running {} {:?}", self.config.ffmpeg_path.display(), args);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ConverterError::conversion_failed("ffmpeg stderr not captured", None))?;
        let mut reader = BufReader::new(stderr);

        let mut parser = ProgressParser::new(duration_secs);
        let progress_interval = Duration::from_millis(self.config.progress_interval_ms);
        let mut last_progress_send: Option<Instant> = None;
        let mut error_output = String::new();
        let mut raw = Vec::new();

        // Drain to EOF so ffmpeg never blocks on a full pipe
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Stopped reading ffmpeg stderr: {}", e);
                    let _ = child.start_kill();
                    break;
                }
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end();

            if line.contains("Error") || line.contains("error") {
                error_output.push_str(line);
                error_output.push('\n');
            }

            if !parser.feed(line) {
                continue;
            }

            if let Some(ref tx) = progress_tx {
                let due = last_progress_send
                    .map(|t| t.elapsed() >= progress_interval)
                    .unwrap_or(true);
                // The final block is always forwarded
                if due || parser.is_finished() {
                    // Non-blocking send
                    let _ = tx.try_send(parser.snapshot());
                    last_progress_send = Some(Instant::now());
                }
            }
        }

        // The stream is exhausted, release the sender before waiting on the process
        drop(progress_tx);

        let status = child.wait().await?;
        if !status.success() {
            return Err(ConverterError::conversion_failed(
                format!("FFmpeg exited with code: {:?}", status.code()),
                if error_output.is_empty() {
                    None
                } else {
                    Some(error_output)
                },
            ));
        }

        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| ConverterError::conversion_failed("Output file not created", None))?;

        Ok(ConversionResult {
            output_path: job.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            format: job.format,
        })
    }

    async fn check_binary(
        path: &Path,
        not_found: impl FnOnce() -> ConverterError,
    ) -> Result<(), ConverterError> {
        match Command::new(path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(ConverterError::conversion_failed(
                format!("{} -version exited with code: {:?}", path.display(), output.status.code()),
                None,
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(ConverterError::Io(e)),
        }
    }
}

/// Accumulates `-progress` key/value lines into progress snapshots.
struct ProgressParser {
    duration_secs: Option<f64>,
    time_regex: Option<Regex>,
    speed_regex: Option<Regex>,
    current_time: f64,
    current_speed: Option<String>,
    finished: bool,
}

impl ProgressParser {
    fn new(duration_secs: Option<f64>) -> Self {
        Self {
            duration_secs,
            // Both keys are reported in microseconds
            time_regex: Regex::new(r"^out_time_(?:us|ms)=(\d+)").ok(),
            speed_regex: Regex::new(r"^speed=\s*(\d+\.?\d*)x").ok(),
            current_time: 0.0,
            current_speed: None,
            finished: false,
        }
    }

    /// Feeds one stderr line. Returns true when a progress block is complete.
    fn feed(&mut self, line: &str) -> bool {
        let line = line.trim();

        if let Some(ref re) = self.time_regex {
            if let Some(caps) = re.captures(line) {
                if let Some(us) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                    self.current_time = us / 1_000_000.0;
                }
                return false;
            }
        }

        if let Some(ref re) = self.speed_regex {
            if let Some(caps) = re.captures(line) {
                if let Some(speed) = caps.get(1) {
                    self.current_speed = Some(format!("{}x", speed.as_str()));
                }
                return false;
            }
        }

        if let Some(state) = line.strip_prefix("progress=") {
            self.finished = state == "end";
            return true;
        }
        false
    }

    /// True once ffmpeg has reported its last progress block.
    fn is_finished(&self) -> bool {
        self.finished
    }

    fn snapshot(&self) -> ConversionProgress {
        let percent = self
            .duration_secs
            .map(|dur| (self.current_time / dur * 100.0).clamp(0.0, 100.0) as f32);

        ConversionProgress {
            percent,
            time_secs: self.current_time,
            speed: self.current_speed.clone(),
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        self.run_conversion(&job, None).await
    }

    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionResult, ConverterError> {
        self.run_conversion(&job, Some(progress_tx)).await
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Self::check_binary(&self.config.ffmpeg_path, || ConverterError::FfmpegNotFound {
            path: self.config.ffmpeg_path.clone(),
        })
        .await?;

        Self::check_binary(&self.config.ffprobe_path, || {
            ConverterError::FfprobeNotFound {
                path: self.config.ffprobe_path.clone(),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AudioFormat;
    use std::path::PathBuf;

    #[test]
    fn test_build_args_audio_only() {
        let converter = FfmpegConverter::with_defaults();
        let args = converter.build_args(
            Path::new("/in/movie.mkv"),
            Path::new("/out/movie.ogg"),
            AudioFormat::Ogg.ffmpeg_codec(),
        );

        let pos = |flag: &str| args.iter().position(|a| a == flag);
        assert_eq!(args[pos("-i").unwrap() + 1], "/in/movie.mkv");
        assert_eq!(args[pos("-c:a").unwrap() + 1], "libvorbis");
        assert!(pos("-vn").is_some());
        assert!(pos("-sn").is_some());
        assert!(pos("-n").is_some());
        assert!(pos("-y").is_none());
        assert_eq!(args[pos("-progress").unwrap() + 1], "pipe:2");
        assert_eq!(args.last().unwrap(), "/out/movie.ogg");
    }

    #[test]
    fn test_build_args_extra_before_output() {
        let mut config = ConverterConfig::default();
        config.extra_ffmpeg_args = vec!["-threads".to_string(), "2".to_string()];
        config.ffmpeg_log_level = "error".to_string();
        let converter = FfmpegConverter::new(config);

        let args = converter.build_args(
            Path::new("/in/a.mp4"),
            Path::new("/out/a.wav"),
            AudioFormat::Wav.ffmpeg_codec(),
        );

        let n = args.len();
        assert_eq!(&args[n - 3..], ["-threads", "2", "/out/a.wav"]);
        assert!(args.contains(&"pcm_s16le".to_string()));
        let level = args.iter().position(|a| a == "-loglevel").unwrap();
        assert_eq!(args[level + 1], "error");
    }

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{
            "format": {
                "filename": "test.mkv",
                "format_name": "matroska,webm",
                "duration": "7200.500000",
                "size": "5000000000"
            }
        }"#;
        let duration = FfmpegConverter::parse_probe_duration(json).unwrap();
        assert!((duration.unwrap() - 7200.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_probe_without_duration() {
        let json = r#"{ "format": { "filename": "live.ts" } }"#;
        assert_eq!(FfmpegConverter::parse_probe_duration(json).unwrap(), None);
    }

    #[test]
    fn test_parse_probe_garbage() {
        let err = FfmpegConverter::parse_probe_duration("not json").unwrap_err();
        assert!(matches!(err, ConverterError::ParseError { .. }));
    }

    #[test]
    fn test_progress_parser_block() {
        let mut parser = ProgressParser::new(Some(200.0));
        assert!(!parser.feed("frame=0"));
        assert!(!parser.feed("out_time_us=50000000"));
        assert!(!parser.feed("out_time_ms=50000000"));
        assert!(!parser.feed("speed=12.5x"));
        assert!(parser.feed("progress=continue"));

        let progress = parser.snapshot();
        assert_eq!(progress.percent, Some(25.0));
        assert!((progress.time_secs - 50.0).abs() < f64::EPSILON);
        assert_eq!(progress.speed.as_deref(), Some("12.5x"));
    }

    #[test]
    fn test_progress_parser_unknown_duration() {
        let mut parser = ProgressParser::new(None);
        parser.feed("out_time_us=1000000");
        assert!(parser.feed("progress=end"));
        assert_eq!(parser.snapshot().percent, None);
    }

    #[test]
    fn test_progress_parser_clamps_percent() {
        let mut parser = ProgressParser::new(Some(10.0));
        parser.feed("out_time_us=20000000");
        assert_eq!(parser.snapshot().percent, Some(100.0));
    }

    #[test]
    fn test_progress_parser_tracks_end_block() {
        let mut parser = ProgressParser::new(None);
        assert!(parser.feed("progress=continue"));
        assert!(!parser.is_finished());
        assert!(parser.feed("progress=end"));
        assert!(parser.is_finished());
    }

    #[test]
    fn test_progress_parser_ignores_na_speed() {
        let mut parser = ProgressParser::new(Some(10.0));
        assert!(!parser.feed("speed=N/A"));
        assert_eq!(parser.snapshot().speed, None);
    }

    #[tokio::test]
    async fn test_missing_input_is_reported() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob::new(
            PathBuf::from("/definitely/not/here.mkv"),
            PathBuf::from("/tmp/here.mp3"),
            AudioFormat::Mp3,
        );
        let err = converter.convert(job).await.unwrap_err();
        assert!(matches!(err, ConverterError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_validate_missing_ffmpeg() {
        let converter = FfmpegConverter::new(ConverterConfig::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        ));
        let err = converter.validate().await.unwrap_err();
        assert!(matches!(err, ConverterError::FfmpegNotFound { .. }));
    }

    /// Writes an executable shell script standing in for ffmpeg.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn scripted_converter(temp: &tempfile::TempDir, body: &str) -> (FfmpegConverter, ConversionJob) {
        let ffmpeg = fake_ffmpeg(temp.path(), body);
        let source = temp.path().join("clip.mp4");
        std::fs::write(&source, b"").unwrap();

        let config = ConverterConfig::with_paths(ffmpeg, temp.path().join("no-ffprobe"))
            .with_progress_interval(60_000);
        let job = ConversionJob::new(source, temp.path().join("clip.mp3"), AudioFormat::Mp3);
        (FfmpegConverter::new(config), job)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_stderr_is_drained() {
        let temp = tempfile::TempDir::new().unwrap();
        let (converter, job) = scripted_converter(
            &temp,
            r#"printf '\377\376 broken\n' >&2
i=0
while [ $i -lt 5000 ]; do
  echo "Error line $i padding padding padding padding padding padding" >&2
  i=$((i+1))
done
exit 1"#,
        );

        let result = tokio::time::timeout(Duration::from_secs(30), converter.convert(job))
            .await
            .expect("conversion did not settle");

        match result {
            Err(ConverterError::ConversionFailed { stderr, .. }) => {
                let stderr = stderr.unwrap();
                assert!(stderr.contains("Error line 0 "));
                assert!(stderr.contains("Error line 4999 "));
            }
            other => panic!("expected ConversionFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_final_progress_is_not_throttled() {
        let temp = tempfile::TempDir::new().unwrap();
        let (converter, job) = scripted_converter(
            &temp,
            r#"printf 'out_time_us=1000000\nprogress=continue\nout_time_us=2000000\nprogress=continue\nout_time_us=3000000\nprogress=end\n' >&2
for last; do :; done
: > "$last"
exit 0"#,
        );

        let (tx, mut rx) = mpsc::channel(8);
        let result = converter.convert_with_progress(job, tx).await;
        assert!(result.is_ok(), "{:?}", result);

        let mut times = Vec::new();
        while let Some(progress) = rx.recv().await {
            times.push(progress.time_secs);
        }
        assert_eq!(times, vec![1.0, 3.0]);
    }
}
