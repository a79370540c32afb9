//! # Data Manager
//!
//! The orchestrator. Commands arrive either from the queue (every message is a
//! `createOrder`) or from callers of [`DataManager::run_query`].
//!
//! - `createOrder` writes through: store first, then the cache if the store
//!   accepted every row.
//! - `getOrder` is cache-aside: a non-empty cache hit never touches the store; a
//!   miss reads the store and caches a complete result.
//!
//! A refresh loop flushes and reloads the cache on a fixed period.

pub mod command;
pub mod data_manager;

pub use command::*;
pub use data_manager::*;
