//! Error taxonomy shared across vlib.
//!
//! Scanning errors (`Configuration`, `Io`) are logged and skipped by callers,
//! streaming errors (`InvalidRange`, `StreamIo`) are scoped to one response,
//! and `MetadataLookup` never escapes the enrichment worker.

/// Common error type for vlib.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured root or setting is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested entry was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested byte range cannot be served for a resource of `total` bytes.
    #[error("Range not satisfiable for resource of {total} bytes")]
    InvalidRange { total: u64 },

    /// A read failed after the response had started.
    #[error("Stream I/O error: {0}")]
    StreamIo(String),

    /// The external metadata lookup failed or timed out.
    #[error("Metadata lookup failed: {0}")]
    MetadataLookup(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidRange error for a resource of `total` bytes.
    pub fn invalid_range(total: u64) -> Self {
        Self::InvalidRange { total }
    }

    /// Create a new StreamIo error.
    pub fn stream_io<S: Into<String>>(msg: S) -> Self {
        Self::StreamIo(msg.into())
    }

    /// Create a new MetadataLookup error.
    pub fn metadata_lookup<S: Into<String>>(msg: S) -> Self {
        Self::MetadataLookup(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error maps to at the protocol boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidRange { .. } => 416,
            Self::InvalidInput(_) => 400,
            _ => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
