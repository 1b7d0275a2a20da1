//! Error types for caption-rs operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! segmentation, the NDJSON wire format, generation backends, storage, I/O,
//! and CLI commands.

use thiserror::Error;

/// Result type alias for caption-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for caption-rs operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Segmentation errors (re-chunking text).
    #[error("segment error: {0}")]
    Segment(#[from] SegmentError),

    /// Wire-format errors (NDJSON lines).
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Generation backend errors (upstream LLM calls).
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Storage-related errors (settings and history).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors (file and terminal operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Segmentation errors.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Invalid UTF-8 encountered at a byte offset of the input stream.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where invalid UTF-8 was found.
        offset: usize,
    },

    /// The stream ended in the middle of a UTF-8 sequence.
    #[error("stream ended inside a UTF-8 sequence ({pending} bytes pending)")]
    IncompleteUtf8 {
        /// Number of bytes that never formed a complete character.
        pending: usize,
    },

    /// Invalid segmenter configuration.
    #[error("invalid segment configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Unknown segmentation mode.
    #[error("unknown segment mode: {name}")]
    UnknownMode {
        /// Name of the unknown mode.
        name: String,
    },

    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
}

/// Errors from the newline-delimited JSON wire format.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A line could not be parsed as JSON.
    #[error("malformed line: {reason}")]
    MalformedLine {
        /// Parser message.
        reason: String,
    },

    /// A line was not valid UTF-8.
    #[error("line is not valid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset within the line.
        offset: usize,
    },
}

/// Errors raised by generation backends.
#[derive(Error, Debug)]
pub enum BackendError {
    /// A required request parameter is missing.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Workflow mode was selected without a workflow id.
    #[error("missing workflow id")]
    MissingWorkflowId,

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Context for the failure.
        message: String,
    },

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Error surfaced by the OpenAI-compatible client.
    #[error("openai error: {0}")]
    OpenAi(String),

    /// The upstream reply did not contain any text.
    #[error("upstream reply contained no text")]
    EmptyReply,
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// I/O-specific errors for file and terminal operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read input.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path to the input (`-` for stdin).
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

// Implement From traits for library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedLine {
            reason: err.to_string(),
        }
    }
}

impl From<regex::Error> for SegmentError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for SegmentError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8 {
            offset: err.utf8_error().valid_up_to(),
        }
    }
}

impl From<std::str::Utf8Error> for SegmentError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8 {
            offset: err.valid_up_to(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        err.status().map_or_else(
            || Self::Request(err.to_string()),
            |status| Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.into())
    }
}

impl From<async_openai::error::OpenAIError> for BackendError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::OpenAi(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Backend(err.into())
    }
}
