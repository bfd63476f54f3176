//! Error types for scenekit-assets.

use thiserror::Error;

/// Result type for asset store operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Errors that can occur while loading asset metadata.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Malformed delimited data.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Error message.
        message: String,
        /// 1-based line number where the error occurred.
        line: usize,
    },

    /// A CSV/TSV load without a usable header row.
    #[error("missing header row")]
    MissingHeader,

    /// JSON/JSONL deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSONL line (or JSON array entry) that is not an object.
    #[error("expected a json object at line {line}")]
    NotAnObject { line: usize },
}

impl AssetError {
    /// Create a parse error at a given 1-based line.
    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
        }
    }
}

/// Error from the structured query parser.
///
/// Never surfaced by [`crate::AssetDb::query`] (which degrades to the simple
/// filter), only by direct use of [`crate::Filter::parse`].
#[derive(Debug, Clone, Error)]
#[error("invalid query '{query}': {reason}")]
pub struct QueryParseError {
    /// The offending query string.
    pub query: String,
    /// What was wrong with it.
    pub reason: String,
}
