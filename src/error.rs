use thiserror::Error;

/// Error type for pgbind operations
#[derive(Debug, Error)]
pub enum PgBindError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {0} is NULL")]
    UnexpectedNull(String),

    /// A NULL reached a binding that has no indicator to report it through.
    #[error("NULL fetched at row {row} into a binding without an indicator")]
    NullWithoutIndicator { row: usize },

    #[error("Indicator count {indicators} does not match value count {values}")]
    IndicatorSizeMismatch { values: usize, indicators: usize },

    #[error("Bulk binding size mismatch: expected {expected}, got {actual}")]
    BulkSizeMismatch { expected: usize, actual: usize },

    #[error("Bulk into binding has size 0")]
    EmptyBulkInto,

    #[error("Cannot mix scalar and bulk into bindings in one statement")]
    MixedIntoShapes,

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Statement binds {bound} into column(s), result has {returned}")]
    ColumnCountMismatch { bound: usize, returned: usize },

    /// Failure raised by a user-supplied `TypeConversion`.
    #[error("Conversion failed: {0}")]
    Conversion(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PgBindError {
    /// Wraps any error (or message) raised inside a `TypeConversion` impl.
    pub fn conversion<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PgBindError::Conversion(err.into())
    }
}

/// Result type alias for pgbind operations
pub type Result<T> = std::result::Result<T, PgBindError>;
