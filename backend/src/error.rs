//! Error types for the sent summary pipeline.
//!
//! The hierarchy mirrors the pipeline stages:
//!
//! - [`GradeError`] - grade text that cannot be parsed or compared
//! - [`RowError`] - a CSV row that cannot become a [`crate::models::Climb`]
//! - [`AggregateError`] - statistics that cannot be computed
//! - [`CsvError`] - decoding and reading the uploaded file
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ConfigError`] / [`ServerError`] - the HTTP shell
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Grade Errors
// =============================================================================

/// Errors while parsing or ranking climbing grades.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    /// Text is not in the route (YDS) or boulder (V-scale) vocabulary.
    #[error("Unrecognized grade '{0}'")]
    Malformed(String),

    /// A route grade was ranked against a boulder grade.
    #[error("Cannot compare '{left}' with '{right}': different grade families")]
    FamilyMismatch { left: String, right: String },
}

// =============================================================================
// Row Errors
// =============================================================================

/// Errors turning one CSV row into a climb.
///
/// `line` is the 1-based line of the record in the uploaded file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// The Rating column holds an unparseable grade.
    #[error("Line {line}, column 'Rating': {source}")]
    MalformedGrade { line: usize, source: GradeError },

    /// A date, number or required text field is invalid.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    MalformedField {
        line: usize,
        column: String,
        value: String,
        message: String,
    },

    /// The row does not carry an expected export column.
    #[error("Line {line}: missing column '{column}'")]
    UnsupportedSchema { line: usize, column: String },
}

impl RowError {
    /// Line of the offending record.
    pub fn line(&self) -> usize {
        match self {
            RowError::MalformedGrade { line, .. }
            | RowError::MalformedField { line, .. }
            | RowError::UnsupportedSchema { line, .. } => *line,
        }
    }
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors while reducing climbs to statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// Two sends in the same bucket carry grades from different families.
    #[error("Cannot rank '{first}' against '{second}': {source}")]
    MixedGradeFamilies {
        first: String,
        second: String,
        source: GradeError,
    },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while decoding and reading the export file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the bytes as text.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// The CSV reader rejected a record.
    #[error("Invalid CSV at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header lacks columns of the export schema.
    #[error("Unsupported CSV schema, missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::pipeline::summarize_bytes`]
/// and friends. The first failure aborts the whole request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV decoding or reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// A row could not be normalized.
    #[error("Row error: {0}")]
    Row(#[from] RowError),

    /// Statistics could not be computed.
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Socket bind or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for grade operations.
pub type GradeResult<T> = Result<T, GradeError>;

/// Result type for row normalization.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
