//! # Persistent Store Adapter
//!
//! Writes a composite order across four relations and reads it back.
//!
//! ## Structure
//!
//! - [`OrderStore`] - the async interface the data manager depends on
//! - [`RelationalStore`] - the implementation over [`OrderTables`]
//! - [`QueryResult`] - tagged result with per-entity status codes
//! - [`StoreError`] - one recorded failure
//!
//! ## Write semantics
//!
//! `create_order` writes delivery, payment, each item and finally the header,
//! in that order. Every write is attempted even if an earlier one failed.
//! Under [`WritePolicy::BestEffort`] whatever was written stays written; under
//! [`WritePolicy::Atomic`] the rows inserted by the failing call are deleted
//! again once all writes were attempted. Neither policy hides the partial state
//! from a concurrent reader.

pub mod error;
pub mod relational;
pub mod result;
pub mod tables;

pub use error::*;
pub use relational::*;
pub use result::*;
pub use tables::*;

use async_trait::async_trait;
use std::fmt::Display;
use std::str::FromStr;

/// Store operations used by the data manager.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Decodes a composite document and writes its rows.
    async fn create_order(&self, payload: &[u8]) -> WriteResult;

    /// Looks an order up from a `{"order_uid": ...}` payload and reassembles it.
    async fn get_order(&self, payload: &[u8]) -> ReadResult;

    /// Reassembles every stored order into one JSON array payload.
    async fn grep_all_orders(&self) -> ReadResult;

    /// Releases the connection.
    async fn close(&self);
}

/// What to do with rows already written when a later write of the same
/// `create_order` fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Keep them.
    #[default]
    BestEffort,
    /// Delete them again.
    Atomic,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" => Ok(WritePolicy::BestEffort),
            "atomic" => Ok(WritePolicy::Atomic),
            other => Err(format!("unknown write policy: {}", other)),
        }
    }
}

impl Display for WritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WritePolicy::BestEffort => write!(f, "best-effort"),
            WritePolicy::Atomic => write!(f, "atomic"),
        }
    }
}
