//! Error types for brandplot operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying aesthetics or building charts.
#[derive(Error, Debug)]
pub enum Error {
    /// Something other than a tabular dataset was supplied.
    #[error("Invalid input type: expected {expected}, got {found}")]
    InvalidInputType {
        /// What the caller was expected to pass.
        expected: &'static str,
        /// What was actually found.
        found: String,
    },

    /// A literal in a static-color position is not a recognized color.
    #[error("Invalid color specification: '{0}' is neither a hex color (#RGB, #RRGGBB, #RRGGBBAA) nor a named color")]
    InvalidColorSpec(String),

    /// An enumerated parameter received a value outside its allowed set.
    #[error("Invalid value '{value}' for parameter '{parameter}' (allowed: {allowed})")]
    InvalidParameterValue {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: String,
        /// Human-readable list of accepted values.
        allowed: String,
    },

    /// A parameter required by the selected mode was omitted.
    #[error("Missing required parameter '{parameter}': {reason}")]
    MissingRequiredParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Why the parameter is needed.
        reason: String,
    },

    /// Referenced column does not exist in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column exists but has the wrong type for the requested role.
    #[error("Column '{column}' must be {expected}")]
    ColumnType {
        /// Column name.
        column: String,
        /// Expected column type.
        expected: &'static str,
    },

    /// Column lengths disagree.
    #[error("Data length mismatch: column '{column}' has {found} rows, dataset has {expected}")]
    DataLengthMismatch {
        /// Offending column.
        column: String,
        /// Row count of the dataset.
        expected: usize,
        /// Row count of the column.
        found: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration parsing error with line number.
    #[error("Configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Configuration file not found or unreadable.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Error raised by the underlying plotting library.
    #[error("Rendering error: {0}")]
    Render(#[from] trueno_viz::Error),
}

impl Error {
    /// Build an [`Error::InvalidParameterValue`] from a list of accepted values.
    pub(crate) fn invalid_parameter(
        parameter: &'static str,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        Error::InvalidParameterValue {
            parameter,
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }
}
