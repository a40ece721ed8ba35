//! Error types for the pixelload pipeline.
//!
//! This module defines one error family per pipeline stage:
//!
//! - [`CsvError`] - pixel CSV parsing errors
//! - [`TransformError`] - batch transform errors
//! - [`ScenarioError`] - payload/scenario emission errors
//! - [`ValidationError`] - generated config validation errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during pixel CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File parsed but contained no pixel rows.
    #[error("{} contains no pixel rows", path.display())]
    Empty { path: PathBuf },

    /// Header row is missing a required column.
    #[error("{} is missing required column '{column}'", path.display())]
    MissingHeader { path: PathBuf, column: &'static str },

    /// A row is missing a value for a required column.
    #[error("{}:{line}: missing value for column '{column}'", path.display())]
    MissingValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
    },

    /// A coordinate cell did not parse as an unsigned integer.
    #[error("{}:{line}: invalid {column} coordinate '{value}'", path.display())]
    InvalidCoordinate {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },

    /// The CSV reader itself rejected the file.
    #[error("{} is not valid CSV: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors during batch transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A pixel coordinate exceeds the mirror bound.
    #[error("row {row}: pixel ({x}, {y}) is outside the mirror bound {bound}")]
    MirrorOutOfBounds { row: usize, x: u32, y: u32, bound: u32 },
}

// =============================================================================
// Scenario Emission Errors
// =============================================================================

/// Errors while writing payload or scenario files.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to write a generated file.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload line did not parse back as a pixel record.
    #[error("{}:{line}: malformed payload record: {source}", path.display())]
    MalformedPayload {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during generated config validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    Schema { errors: Vec<String> },

    /// Declared arrival volume does not cover the payload records.
    #[error("config declares {declared} arrivals but payload holds {records} records")]
    EventBudget { declared: u64, records: u64 },

    /// JSON error while loading a config under validation.
    #[error("Validation JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by the generator entry points in
/// [`crate::transform::pipeline`]. It wraps all lower-level errors and adds
/// pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transform error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Scenario emission error.
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Wrong number of start ids for the batches given.
    #[error("{given} start ids given for {batches} batches")]
    StartIds { given: usize, batches: usize },

    /// Two batches resolve to the same output filename.
    #[error("two batches named '{name}' would both write {file}")]
    DuplicateBatch { name: String, file: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for scenario emission operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::Empty {
            path: PathBuf::from("wave.csv"),
        };
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("no pixel rows"));

        // TransformError -> PipelineError
        let transform_err = TransformError::MirrorOutOfBounds {
            row: 3,
            x: 70,
            y: 2,
            bound: 63,
        };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("(70, 2)"));
    }

    #[test]
    fn test_csv_error_addresses_row() {
        let err = CsvError::InvalidCoordinate {
            path: PathBuf::from("team1.csv"),
            line: 12,
            column: "x",
            value: "abc".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("team1.csv:12"));
        assert!(msg.contains("invalid x coordinate 'abc'"));
    }

    #[test]
    fn test_event_budget_format() {
        let err = ValidationError::EventBudget {
            declared: 10,
            records: 25,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 arrivals"));
        assert!(msg.contains("25 records"));
    }
}
