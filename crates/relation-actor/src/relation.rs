//! # Relation Trait
//!
//! Defines the contract every row type must satisfy to be stored by a [`TableActor`](crate::TableActor).

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A row type that can live in a relation table.
///
/// # Architecture Note
/// By describing rows through one small contract, the table loop in
/// [`TableActor`](crate::TableActor) is written *once* and reused for orders,
/// deliveries, payments and items alike.
///
/// Unlike an auto-increment table, the key is carried by the row itself:
/// callers decide it (a natural key such as `chrt_id`, or a synthetic id
/// generated before the insert).
pub trait Relation: Clone + Send + Sync + Debug + 'static {
    /// The key that identifies a row (e.g. `String`, `i64`).
    type Key: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Relation name used in logs and errors (e.g. `"orders"`).
    const NAME: &'static str;

    /// Returns the key of this row.
    fn key(&self) -> Self::Key;
}
