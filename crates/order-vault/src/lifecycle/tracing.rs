//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden; events carry structured fields such
//! as `order_uid`, `relation`, `key` and `outcome` instead.
//!
//! ```bash
//! # Lifecycle, ingestion and cache activity
//! RUST_LOG=info cargo run -p order-vault
//!
//! # Every table request and cache lookup
//! RUST_LOG=debug cargo run -p order-vault
//!
//! # Only the relation engine
//! RUST_LOG=relation_actor=debug cargo run -p order-vault
//! ```
//!
//! A single order ingested from the queue logs roughly:
//!
//! ```text
//! INFO Received message from queue, starting processing bytes=1094
//! INFO Running query command=createOrder
//! INFO Inserted relation="deliveries" key=QWERTYUIOPASDFGH size=1
//! INFO Inserted relation="payments" key=ZXCVBNMLKJHGFDSA size=1
//! INFO Inserted relation="items" key=9934930 size=1
//! INFO Inserted relation="orders" key=b563feb7b2b84b6test size=1
//! INFO Saved order in cache order_uid=b563feb7b2b84b6test
//! INFO Processed queued order outcome="stored"
//! ```

/// Installs the global subscriber. Call once, from the binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
