//! Custom error types for ivsort operations.
//!
//! Every failure of a sort surfaces as one [`SortError`] whose message starts with
//! `sorting failed:`. The variants fall into three kinds (see [`ErrorKind`]):
//! configuration problems detected before any processing, decode failures on a
//! data line, and resource (I/O) failures while spilling, merging or writing.

use std::io;

use thiserror::Error;

/// Result type alias for ivsort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// A data-shaped line that could not be parsed by its codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_number}: {reason}: '{line}'")]
pub struct DecodeError {
    /// 1-based line number within the input
    pub line_number: u64,
    /// The raw text of the offending line
    pub line: String,
    /// Explanation of why it could not be decoded
    pub reason: String,
}

impl DecodeError {
    /// Creates a decode error for the given line.
    #[must_use]
    pub fn new(line_number: u64, line: &str, reason: impl Into<String>) -> Self {
        Self { line_number, line: line.to_string(), reason: reason.into() }
    }
}

/// Error type for ivsort operations
#[derive(Error, Debug)]
pub enum SortError {
    /// No codec is registered for the file's extension
    #[error("sorting failed: unsupported file extension for '{path}' (supported: {supported})")]
    UnsupportedExtension {
        /// The offending path
        path: String,
        /// Comma-separated list of supported extensions
        supported: String,
    },

    /// Invalid parameter value provided
    #[error("sorting failed: invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// An input, output or temporary path is unusable
    #[error("sorting failed: {description} '{path}': {reason}")]
    InvalidPath {
        /// Role of the path (e.g., "Input file", "Temp directory")
        description: String,
        /// The path
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A data line of the input could not be decoded
    #[error("sorting failed: malformed record in '{path}' at {source}")]
    Decode {
        /// Path of the file being decoded
        path: String,
        /// The underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// I/O failure while reading, spilling, merging or writing
    #[error("sorting failed: {context}: {source}")]
    Resource {
        /// What was being done when the failure happened
        context: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a [`SortError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected before any processing starts
    Configuration,
    /// A data-shaped input line failed to parse
    Decode,
    /// I/O failure mid-operation
    Resource,
}

impl SortError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedExtension { .. }
            | Self::InvalidParameter { .. }
            | Self::InvalidPath { .. } => ErrorKind::Configuration,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Resource { .. } => ErrorKind::Resource,
        }
    }

    /// Returns the decode failure, if this is a decode error.
    #[must_use]
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn resource(context: impl Into<String>, source: io::Error) -> Self {
        Self::Resource { context: context.into(), source }
    }
}

/// Attaches resource context to I/O results.
pub(crate) trait ResourceContext<T> {
    fn resource_context<F, C>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> ResourceContext<T> for io::Result<T> {
    fn resource_context<F, C>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| SortError::resource(context(), e))
    }
}
