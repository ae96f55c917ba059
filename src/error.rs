//! docclass error types

use std::path::PathBuf;
use std::time::Duration;

/// docclass error types
#[derive(Debug, thiserror::Error)]
pub enum DocclassError {
    // Invocation errors
    #[error("Missing PDF file argument")]
    MissingArgument,

    // Document errors
    #[error("No text found in PDF")]
    NoText,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not a PDF file", .0.display())]
    InvalidPdf(PathBuf),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Model errors
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("empty response from model")]
    EmptyResponse,
}

impl DocclassError {
    /// Build an I/O error tagged with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the input file could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias for docclass operations
pub type Result<T> = std::result::Result<T, DocclassError>;
