//! Error types for hepfilter-core.

use crate::detid::DetId;
use thiserror::Error;

/// Result type alias for hepfilter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for hepfilter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A matched reference object has no entry in a weight source.
    #[error("weight source '{source_name}' has no entry for reference index {index}")]
    MissingWeight {
        /// Configured identifier of the weight source.
        source_name: String,
        /// Position of the matched object in the reference collection.
        index: usize,
    },

    /// The geometry has no position for a cell that carries a measurement.
    #[error("no position known for cell {0}")]
    UnknownPosition(DetId),

    /// Column length does not match the table row count.
    #[error("column '{column}' has {found} values, table has {expected} rows")]
    ColumnLength {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// A column with this name already exists in the table.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
