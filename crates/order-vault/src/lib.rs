//! # Order Vault
//!
//! Ingests order documents from a message topic, stores them normalized across
//! four relations and serves them back through a read-through cache.
//!
//! ## Data flow
//!
//! ```text
//!  topic ──> ingestion loop ──createOrder──> RelationalStore ──> orders / deliveries /
//!                 │                               │               payments / items
//!                 └──── write-through ──> CacheVault <── refresh loop (clear + reload)
//!
//!  getOrder ──> CacheVault ──miss──> RelationalStore ──> CacheVault
//! ```
//!
//! ## Module Tour
//!
//! - [`model`] - the composite [`OrderDocument`](model::OrderDocument) and the
//!   four normalized records stored as [`relation_actor::Relation`]s.
//! - [`codec`] - JSON encoding of documents, lookups and bulk payloads.
//! - [`decompose`] - splits a document into records and joins them back.
//! - [`store`] - the [`OrderStore`](store::OrderStore) adapter with per-entity
//!   status codes.
//! - [`cache`] - the [`CacheVault`](cache::CacheVault).
//! - [`queue`] - consumer/producer traits and the in-memory topic.
//! - [`manager`] - the [`DataManager`](manager::DataManager): command routing,
//!   the ingestion loop and the refresh loop.
//! - [`lifecycle`] - [`OrderSystem`](lifecycle::OrderSystem) startup/shutdown and
//!   logging setup.
//! - [`config`] - environment-driven settings.

pub mod cache;
pub mod codec;
pub mod config;
pub mod decompose;
pub mod lifecycle;
pub mod manager;
pub mod model;
pub mod queue;
pub mod store;
