//! Entry ordering and output naming.

use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::converter::AudioFormat;
use crate::fs::DirEntry;

/// Collation class: separators and punctuation, then digits, then letters.
fn primary_key(c: char) -> (u8, char) {
    let class = if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    };
    (class, c.to_lowercase().next().unwrap_or(c))
}

/// Base letters of a name: canonical decomposition with combining marks removed.
fn base_chars(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().filter(|c| !is_combining_mark(*c))
}

/// Compares two names the way a human-facing, locale-aware sort does.
///
/// Letters compare by base letter first, ignoring accents and case. Names
/// equal on that level are ordered unaccented before accented, then
/// lowercase before uppercase. Raw code point order breaks any remaining
/// tie so the result is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_chars(a)
        .map(primary_key)
        .cmp(base_chars(b).map(primary_key))
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| {
            base_chars(a)
                .map(char::is_uppercase)
                .cmp(base_chars(b).map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Sorts a directory listing into visiting order.
pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(|a, b| compare_names(&a.name.to_string_lossy(), &b.name.to_string_lossy()));
}

/// Output file name for a source file: the final extension replaced by the format.
///
/// `archive.tar.gz` becomes `archive.tar.<format>`; a name without an extension
/// keeps its full name as the stem.
pub fn target_file_name(name: &OsStr, format: AudioFormat) -> OsString {
    let stem = Path::new(name).file_stem().unwrap_or(name);
    let mut target = stem.to_os_string();
    target.push(".");
    target.push(format.extension());
    target
}
