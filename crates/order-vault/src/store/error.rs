//! Error types for the store adapter.

use crate::codec::CodecError;
use relation_actor::TableError;
use thiserror::Error;

/// One failure recorded while serving a store query.
///
/// A single query can collect several of these (one per failing relation
/// write or lookup); see [`QueryResult::combined_error`](super::QueryResult::combined_error).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The request payload could not be decoded, or the reply could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Creating a row failed.
    #[error("failed on creating new row in {relation} table (key {key}): {source}")]
    Write {
        relation: &'static str,
        key: String,
        #[source]
        source: TableError,
    },

    /// Looking a row up failed at the table level.
    #[error("failed on find row in {relation} table (key {key}): {source}")]
    Read {
        relation: &'static str,
        key: String,
        #[source]
        source: TableError,
    },

    /// The lookup succeeded but no row carries the key.
    #[error("no row in {relation} table for key {key}")]
    Missing { relation: &'static str, key: String },

    /// Removing a row written by a failed atomic create did not succeed.
    #[error("failed to roll back row in {relation} table (key {key}): {source}")]
    Rollback {
        relation: &'static str,
        key: String,
        #[source]
        source: TableError,
    },
}
