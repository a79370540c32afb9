//! # Relation Actor
//!
//! A small relation engine built on the **Actor Model**. Every relation (a named
//! table of rows keyed by a natural or synthetic key) is owned by exactly one
//! Tokio task, the [`TableActor`]. Callers never touch the rows directly; they
//! talk to the actor through a cheap, cloneable [`TableClient`].
//!
//! ## Why one actor per relation?
//!
//! - **Isolated state**: the `HashMap` behind a relation is owned by a single task,
//!   so no lock guards it. Requests for one relation are applied sequentially.
//! - **Independent relations**: four relations means four tasks. A slow scan over
//!   one table never blocks inserts into another.
//! - **Row-at-a-time semantics**: there is no transaction spanning relations.
//!   Callers that write several relations see each write succeed or fail on its own.
//!
//! ## Operations
//!
//! | Request | Effect |
//! |---------|--------|
//! | `Insert` | Adds a row. Fails with [`TableError::Conflict`] if the key exists. |
//! | `Get` | Looks a row up by key. `Ok(None)` when absent. |
//! | `Find` | Returns every row matching an optional filter. |
//! | `Delete` | Removes a row by key. Fails with [`TableError::NotFound`] when absent. |
//! | `Count` | Returns the row count. Doubles as a liveness ping. |
//! | `Close` | Stops the actor. Later requests fail with [`TableError::Closed`]. |
//!
//! ## Example
//!
//! ```rust
//! use relation_actor::{Relation, TableActor};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Item { chrt_id: i64, name: String }
//!
//! impl Relation for Item {
//!     type Key = i64;
//!     const NAME: &'static str = "items";
//!     fn key(&self) -> i64 { self.chrt_id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = TableActor::<Item>::new(8);
//!     let handle = tokio::spawn(actor.run());
//!
//!     client.insert(Item { chrt_id: 1, name: "Mascaras".into() }).await.unwrap();
//!     let row = client.get(1).await.unwrap();
//!     assert_eq!(row.unwrap().name, "Mascaras");
//!
//!     client.close().await.unwrap();
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Testing
//!
//! See [`mock`] for [`MockTable`](mock::MockTable), which answers requests from a queue
//! of expectations instead of real state. It is the easy way to make one relation fail.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod relation;

// Re-export core types for convenience
pub use actor::TableActor;
pub use client::TableClient;
pub use error::TableError;
pub use message::{Response, RowFilter, TableRequest};
pub use relation::Relation;
