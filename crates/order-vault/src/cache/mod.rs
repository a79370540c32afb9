//! # Cache Vault
//!
//! Read-mostly, in-memory copy of serialized orders keyed by `order_uid`.
//! Written through on successful creates and on store reads that missed the
//! cache; flushed and rebuilt wholesale by the refresh loop.

pub mod vault;

pub use vault::*;

use crate::codec::CodecError;
use thiserror::Error;

/// Errors raised by cache writes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cannot cache document: {0}")]
    InvalidDocument(CodecError),
}
