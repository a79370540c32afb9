use crate::queue::{QueueConsumer, QueueError, QueueProducer};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// In-process topic on a broadcast channel.
///
/// A subscriber only sees payloads published after it subscribed. A subscriber
/// that falls more than `capacity` payloads behind skips the oldest ones.
#[derive(Clone)]
pub struct MemoryTopic {
    name: String,
    sender: broadcast::Sender<Vec<u8>>,
}

impl MemoryTopic {
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, QueueError> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueueError::EmptyTopic);
        }
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { topic: name });
        }
        let (sender, _) = broadcast::channel(capacity);
        info!(topic = %name, capacity, "Topic created");
        Ok(Self { name, sender })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> MemoryConsumer {
        debug!(topic = %self.name, "New subscriber");
        MemoryConsumer {
            topic: self.name.clone(),
            receiver: Some(self.sender.subscribe()),
        }
    }

    pub fn producer(&self) -> MemoryProducer {
        MemoryProducer {
            topic: self.name.clone(),
            sender: self.sender.clone(),
        }
    }
}

pub struct MemoryConsumer {
    topic: String,
    receiver: Option<broadcast::Receiver<Vec<u8>>>,
}

#[async_trait]
impl QueueConsumer for MemoryConsumer {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "Consumer lagged, skipping oldest messages");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.receiver.take().is_some() {
            info!(topic = %self.topic, "Consumer closed");
        }
    }
}

#[derive(Clone)]
pub struct MemoryProducer {
    topic: String,
    sender: broadcast::Sender<Vec<u8>>,
}

#[async_trait]
impl QueueProducer for MemoryProducer {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        match self.sender.send(payload) {
            Ok(receivers) => debug!(topic = %self.topic, receivers, "Published"),
            // No subscriber yet; the payload is gone, same as a topic nobody reads.
            Err(_) => debug!(topic = %self.topic, "Published with no subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_topics_are_rejected() {
        assert_eq!(MemoryTopic::new("", 4).err(), Some(QueueError::EmptyTopic));
        assert_eq!(
            MemoryTopic::new("orders", 0).err(),
            Some(QueueError::InvalidCapacity {
                topic: "orders".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_subscriber_sees_messages_in_order() {
        let topic = MemoryTopic::new("orders", 8).unwrap();
        let mut consumer = topic.subscribe();
        let producer = topic.producer();

        producer.publish(b"one".to_vec()).await.unwrap();
        producer.publish(b"two".to_vec()).await.unwrap();

        assert_eq!(consumer.recv().await, Some(b"one".to_vec()));
        assert_eq!(consumer.recv().await, Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_messages() {
        let topic = MemoryTopic::new("orders", 8).unwrap();
        let producer = topic.producer();
        producer.publish(b"early".to_vec()).await.unwrap();

        let mut consumer = topic.subscribe();
        producer.publish(b"late".to_vec()).await.unwrap();

        assert_eq!(consumer.recv().await, Some(b"late".to_vec()));
    }

    #[tokio::test]
    async fn test_lagging_consumer_skips_oldest_and_continues() {
        let topic = MemoryTopic::new("orders", 2).unwrap();
        let mut consumer = topic.subscribe();
        let producer = topic.producer();

        for payload in ["a", "b", "c", "d"] {
            producer.publish(payload.as_bytes().to_vec()).await.unwrap();
        }

        assert_eq!(consumer.recv().await, Some(b"c".to_vec()));
        assert_eq!(consumer.recv().await, Some(b"d".to_vec()));
    }

    #[tokio::test]
    async fn test_closed_consumer_returns_none() {
        let topic = MemoryTopic::new("orders", 8).unwrap();
        let mut consumer = topic.subscribe();
        consumer.close().await;

        topic.producer().publish(b"ignored".to_vec()).await.unwrap();
        assert_eq!(consumer.recv().await, None);
    }

    #[tokio::test]
    async fn test_dropping_every_sender_ends_the_stream() {
        let topic = MemoryTopic::new("orders", 8).unwrap();
        let mut consumer = topic.subscribe();
        drop(topic);

        assert_eq!(consumer.recv().await, None);
    }
}
