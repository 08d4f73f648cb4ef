//! Mapping from audio format names to ffmpeg encoder names.

/// Format name to ffmpeg audio encoder.
const CODEC_MAP: &[(&str, &str)] = &[
    ("mp3", "libmp3lame"),
    ("aac", "aac"),
    ("ogg", "libvorbis"),
    ("wav", "pcm_s16le"),
    ("flac", "flac"),
];

/// Resolves a format name to the ffmpeg codec to request.
///
/// Names outside the map resolve to an empty string rather than an error.
/// The converter rejects an empty codec when the job runs.
pub fn resolve(format: &str) -> &'static str {
    CODEC_MAP
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, codec)| *codec)
        .unwrap_or("")
}
