//! Error types for statement generation.

use thiserror::Error;

/// Failure to extract type or value metadata from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The record does not name a table.
    #[error("record has an empty table name")]
    EmptyTableName,

    /// The record type does not declare a primary key column.
    #[error("record for table '{table}' declares no primary key")]
    MissingPrimaryKey {
        /// Table of the offending record.
        table: String,
    },

    /// A field value has no SQL literal form.
    #[error("column '{column}' holds a value with no SQL literal form: {value}")]
    UnrepresentableValue {
        /// Column holding the value.
        column: String,
        /// Debug rendering of the value.
        value: String,
    },

    /// The record has a shape the extractor cannot describe.
    #[error("unsupported record shape: {0}")]
    UnsupportedShape(String),
}

/// Well-formed metadata that breaks a precondition of the requested statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A by-key statement was requested for a record without a key value.
    #[error("[{table}] primary key can not be empty")]
    EmptyPrimaryKey {
        /// Table of the offending record.
        table: String,
    },

    /// An insert or update was requested for a record without non-key columns.
    #[error("[{table}] there is no field to write")]
    NoFields {
        /// Table of the offending record.
        table: String,
    },
}

/// Errors returned by the statement generators.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Metadata extraction failed.
    #[error("{context} -> {source}")]
    Metadata {
        /// What the generator was doing when extraction failed.
        context: &'static str,
        /// The extractor's error.
        #[source]
        source: ExtractError,
    },

    /// Metadata violates a precondition of the statement.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl GenerateError {
    /// Wraps an extractor error with context.
    #[must_use]
    pub const fn metadata(context: &'static str, source: ExtractError) -> Self {
        Self::Metadata { context, source }
    }

    /// Returns whether this is a metadata extraction failure.
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata { .. })
    }

    /// Returns whether this is a precondition failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for statement generation.
pub type Result<T> = std::result::Result<T, GenerateError>;
