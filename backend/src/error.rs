//! Error types for the outlook service.
//!
//! - [`ValidationError`] - schema conformance failures
//! - [`CodecError`] - CSV decoding/encoding failures
//! - [`PersistError`] - upload orchestration failures
//! - [`ReadError`] - download failures
//! - [`ServerError`] - HTTP server startup errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::schema::ValueKind;

// =============================================================================
// Validation Errors
// =============================================================================

/// A candidate dataset does not conform to the indicator schema.
///
/// Record-level variants carry the zero-based index of the offending record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Input is not a JSON array.
    #[error("Expected an array of records, got {actual}")]
    NotASequence { actual: ValueKind },

    /// Input is an empty array.
    #[error("Dataset is empty: at least one record is required")]
    EmptySequence,

    /// An element is not a JSON object.
    #[error("Record {index}: expected an object, got {actual}")]
    NotARecord { index: usize, actual: ValueKind },

    /// A record has a key that is not an indicator.
    #[error("Record {index}: unknown field '{name}'")]
    UnknownField { index: usize, name: String },

    /// A value has the wrong kind for its indicator.
    #[error("Record {index}: field '{name}' must be {expected}, got {actual}")]
    TypeMismatch {
        index: usize,
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// A record does not carry exactly the indicator set.
    #[error("Record {index}: expected {expected} fields, got {actual}")]
    FieldCountMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

// =============================================================================
// Codec Errors
// =============================================================================

/// Errors while converting between CSV text and records.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The CSV reader or writer failed.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A line does not have the same number of tokens as the first line.
    #[error("Line {line} has {found} values, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The upload could not be decoded to text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Encoded CSV bytes are not valid UTF-8.
    #[error("Encoded CSV is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Persistence Errors
// =============================================================================

/// Errors while accepting and persisting an upload.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Upload body is not JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// CSV upload could not be decoded.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Dataset failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Dataset is too small to be stored.
    #[error("Insufficient data: at least {min} years required, got {actual}")]
    InsufficientData { min: usize, actual: usize },

    /// A validated dataset could not be rendered for storage.
    #[error("Failed to render dataset: {0}")]
    Render(String),

    /// Writing the files failed.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    /// Whether the failure was caused by the uploaded content rather than
    /// by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PersistError::Render(_) | PersistError::Io(_))
    }
}

// =============================================================================
// Read Errors
// =============================================================================

/// Errors while reading a persisted file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// No upload has produced the file yet.
    #[error("No data uploaded yet: {0} not found")]
    NotFound(String),

    /// Reading the file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for uploads.
pub type PersistResult<T> = Result<T, PersistError>;

/// Result type for downloads.
pub type ReadResult<T> = Result<T, ReadError>;
