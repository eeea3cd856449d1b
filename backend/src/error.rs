//! Error types for the autolap analysis pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV loading and decoding errors
//! - [`ValidationError`] - Schema and value validation errors
//! - [`AggregateError`] - Aggregation engine errors
//! - [`ReportError`] - Persistence and export errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while loading a CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the raw bytes.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised while checking a dataset against its schema.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required column is not present in the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Invalid field value.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors returned by [`crate::aggregate`] and [`crate::rotate`].
///
/// These are raised before any partial result is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// The operation requires at least one record.
    #[error("Cannot aggregate an empty record set")]
    EmptyInput,

    /// A referenced field is absent from the record schema.
    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    /// The requested aggregation function is not supported.
    #[error("Unsupported aggregation function: {name}")]
    UnsupportedAggregation { name: String },

    /// A measure field holds a categorical value.
    #[error("Field '{field}' is not numeric")]
    FieldTypeMismatch { field: String },

    /// The query itself is malformed (no row dimensions, no measures...).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while persisting or exporting results.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error.
    #[error("Report IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writer error.
    #[error("Report CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error.
    #[error("Report JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_analysis`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Aggregation error.
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    /// Report error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Nothing left to analyse after cleaning and filtering.
    #[error("No records left after filtering ({0} loaded)")]
    NoRecords(usize),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for aggregation operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
