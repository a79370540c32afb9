//! # Table Errors

/// Errors that can occur when talking to a relation table.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Table closed")]
    Closed,
    #[error("Table dropped response channel")]
    Dropped,
    #[error("Row not found in {relation}: {key}")]
    NotFound { relation: &'static str, key: String },
    #[error("Duplicate key in {relation}: {key}")]
    Conflict { relation: &'static str, key: String },
}
