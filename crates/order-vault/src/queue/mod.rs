//! # Queue Adapters
//!
//! The ingestion loop reads raw order payloads from a [`QueueConsumer`]; tests
//! and the demo binary publish them through a [`QueueProducer`]. [`MemoryTopic`]
//! is the in-process topic backing both.

pub mod memory;

pub use memory::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Topic name must not be empty")]
    EmptyTopic,

    #[error("Topic {topic} needs a capacity of at least 1")]
    InvalidCapacity { topic: String },
}

/// Reading side of a topic.
#[async_trait]
pub trait QueueConsumer: Send + 'static {
    /// Next payload, or `None` once the topic is closed for this consumer.
    async fn recv(&mut self) -> Option<Vec<u8>>;

    /// Stops consuming. Later `recv` calls return `None`.
    async fn close(&mut self);
}

/// Writing side of a topic.
#[async_trait]
pub trait QueueProducer: Send + Sync + 'static {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError>;
}
