//! Error types for the SG Reconciliation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every fatal condition a reconciliation run can hit. Data-quality
//! issues (unmatched pay codes) are not errors; they are returned as data.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the SG Reconciliation Engine.
///
/// # Example
///
/// ```
/// use sg_reconciliation::error::EngineError;
///
/// let error = EngineError::EmptySource {
///     table: "Payslips".to_string(),
/// };
/// assert_eq!(error.to_string(), "Source table 'Payslips' has no rows");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but breaks a rule (bad rate, gaps in the quarter table).
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// A source table file does not exist or cannot be opened.
    #[error("Source file not found: {path}")]
    SourceNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A source table row could not be read or converted.
    #[error("Malformed source '{path}' at line {line}: {message}")]
    SourceFormat {
        /// The source the row came from.
        path: String,
        /// The 1-based line number (the header is line 1).
        line: usize,
        /// A description of the problem.
        message: String,
    },

    /// A required source table has zero rows.
    #[error("Source table '{table}' has no rows")]
    EmptySource {
        /// The logical table name (Payslips, PayCodes, Disbursements).
        table: String,
    },

    /// A year/month/day triple is not a real calendar date.
    #[error("Invalid calendar date: {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        /// The year component.
        year: i32,
        /// The month component.
        month: u32,
        /// The day component.
        day: u32,
    },

    /// A date matched no fiscal quarter window, or more than one.
    #[error("Date {date} resolved to {matches} fiscal quarters (expected exactly one)")]
    QuarterResolution {
        /// The date being resolved.
        date: NaiveDate,
        /// How many windows matched.
        matches: usize,
    },

    /// Two pay-code rules normalize to the same code with different treatments.
    #[error("Conflicting OTE treatments for pay code '{code}': {first:?} vs {second:?}")]
    ConflictingPayCodeRule {
        /// The normalized pay code.
        code: String,
        /// The treatment of the first rule seen.
        first: Option<String>,
        /// The treatment of the conflicting rule.
        second: Option<String>,
    },

    /// An unexpected failure inside a pipeline stage.
    #[error("Computation error in {stage}: {message}")]
    ComputationError {
        /// The pipeline stage that failed.
        stage: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true for errors raised while acquiring source tables.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            EngineError::SourceNotFound { .. }
                | EngineError::SourceFormat { .. }
                | EngineError::EmptySource { .. }
        )
    }

    pub(crate) fn computation(stage: &str, message: impl Into<String>) -> Self {
        EngineError::ComputationError {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
