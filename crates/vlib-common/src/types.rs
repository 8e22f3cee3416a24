//! Core types shared across vlib.

use serde::{Deserialize, Serialize};

/// Container format of a catalog entry, resolved from its lowercase extension.
///
/// Unrecognised extensions fall into [`ContainerFormat::Other`], which streams
/// as `application/octet-stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    WebM,
    Matroska,
    Avi,
    QuickTime,
    Wmv,
    Flv,
    Mpeg,
    ThreeGp,
    Other,
}

impl ContainerFormat {
    /// Resolve a format string (extension, any case, with or without a dot).
    pub fn from_format(format: &str) -> Self {
        match format.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "m4v" => Self::Mp4,
            "webm" => Self::WebM,
            "mkv" => Self::Matroska,
            "avi" => Self::Avi,
            "mov" => Self::QuickTime,
            "wmv" => Self::Wmv,
            "flv" => Self::Flv,
            "mpg" | "mpeg" => Self::Mpeg,
            "3gp" => Self::ThreeGp,
            _ => Self::Other,
        }
    }

    /// MIME type used for the `Content-Type` of streamed bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
            Self::Matroska => "video/x-matroska",
            Self::Avi => "video/x-msvideo",
            Self::QuickTime => "video/quicktime",
            Self::Wmv => "video/x-ms-wmv",
            Self::Flv => "video/x-flv",
            Self::Mpeg => "video/mpeg",
            Self::ThreeGp => "video/3gpp",
            Self::Other => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}
