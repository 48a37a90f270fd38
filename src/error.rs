//! Centralized error types for warenpost-label.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the warenpost-label library.
///
/// Every variant is terminal for the current run. "No matching email" is
/// not an error; see [`crate::pipeline::PipelineOutcome::NoMessages`].
#[derive(Error, Debug)]
pub enum LabelError {
    /// Token cache missing, unreadable, or rejected by the token endpoint.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The notification body did not contain an Internetmarke download link.
    #[error("No label download link found in the notification")]
    LinkNotFound,

    /// The label download answered with a non-success status.
    #[error("Failed to download file from URL: {url} (HTTP {status})")]
    Download { url: String, status: u16 },

    /// Transport-level HTTP failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A matching message did not have the expected part layout or encoding.
    #[error("Malformed message '{id}': {reason}")]
    MalformedMessage { id: String, reason: String },

    /// The label text was too short or empty where a field was expected.
    #[error("Could not read {field} from line {line} of the label ({available} line(s) extracted)")]
    Parse {
        field: &'static str,
        line: usize,
        available: usize,
    },

    /// The label PDF could not be loaded, read or rewritten.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The print command exited with a non-zero status.
    #[error("Printing failed ({status}):\n{output}")]
    Print { status: String, output: String },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, LabelError>`.
pub type Result<T> = std::result::Result<T, LabelError>;

impl LabelError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<lopdf::Error> for LabelError {
    fn from(e: lopdf::Error) -> Self {
        Self::Pdf(e.to_string())
    }
}
