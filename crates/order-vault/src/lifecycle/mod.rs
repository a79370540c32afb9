//! Startup, shutdown and logging setup.

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use self::tracing::setup_tracing;
