//! Path utilities for matching media files by extension.
//!
//! Extension sets are stored lowercase without the leading dot. Matching is
//! case-insensitive on the file name, so `Movie.MP4` matches `mp4`.

use std::path::Path;

/// Extensions recognised when no explicit set is configured.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

/// Normalize a configured extension list: trim, drop a leading dot, lowercase,
/// and remove duplicates and empty strings.
///
/// # Examples
///
/// ```
/// use vlib_common::paths::normalize_extensions;
///
/// let exts = normalize_extensions(&[".MP4".to_string(), "mkv".to_string(), "mp4".to_string()]);
/// assert_eq!(exts, vec!["mp4", "mkv"]);
/// ```
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// The default extension set as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFAULT_VIDEO_EXTENSIONS
        .iter()
        .map(|e| (*e).to_string())
        .collect()
}

/// Check whether `path` has one of `extensions` (already normalized).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vlib_common::paths::has_extension;
///
/// let exts = vec!["mp4".to_string()];
/// assert!(has_extension(Path::new("/videos/Clip.MP4"), &exts));
/// assert!(!has_extension(Path::new("/videos/notes.txt"), &exts));
/// ```
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let format = file_format(path);
    !format.is_empty() && extensions.iter().any(|e| *e == format)
}

/// Lowercase extension of `path` without the dot, or an empty string.
///
/// A leading dot alone (`.hidden`) is not an extension.
pub fn file_format(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// File name component of `path` as display text.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extensions() {
        let exts = normalize_extensions(&[" .Mkv ", "", ".", "AVI", "avi"]);
        assert_eq!(exts, vec!["mkv", "avi"]);
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        let exts = default_extensions();
        assert!(has_extension(Path::new("a/b/Movie.MKV"), &exts));
        assert!(has_extension(Path::new("clip.3gp"), &exts));
        assert!(!has_extension(Path::new("cover.jpg"), &exts));
        assert!(!has_extension(Path::new("README"), &exts));
        assert!(!has_extension(Path::new(".mp4"), &exts));
    }

    #[test]
    fn test_file_format() {
        assert_eq!(file_format(Path::new("/x/Movie.MP4")), "mp4");
        assert_eq!(file_format(Path::new("archive.tar.gz")), "gz");
        assert_eq!(file_format(Path::new("noext")), "");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/videos/a/movie.mp4")), "movie.mp4");
    }
}
