use crate::cache::CacheVault;
use crate::config::AppConfig;
use crate::manager::{DataManager, Workers};
use crate::queue::{MemoryProducer, MemoryTopic, QueueError};
use crate::store::{OrderTables, RelationalStore};
use relation_actor::TableError;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Startup failures.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("can't initialize connection to store: {0}")]
    Store(#[from] TableError),

    #[error("can't initialize queue: {0}")]
    Queue(#[from] QueueError),
}

/// A running order ingestion system.
///
/// Owns the four relation tables, the store adapter over them, the cache vault,
/// the in-memory topic and the data manager's background loops.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::start(&AppConfig::from_env()).await?;
///
/// system.producer.publish(order_json).await?;
/// let order = system.manager.run_query("getOrder", br#"{"order_uid":"A1"}"#).await;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Entry point for `createOrder` / `getOrder` queries.
    pub manager: DataManager<RelationalStore>,

    /// Publishes onto the topic the ingestion loop consumes.
    pub producer: MemoryProducer,

    topic: MemoryTopic,
    workers: Workers,
    table_handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Brings the system up.
    ///
    /// 1. Creates the topic
    /// 2. Spawns the relation tables and pings each of them
    /// 3. Builds the store adapter, the cache vault and the data manager
    /// 4. Subscribes to the topic and starts the ingestion and refresh loops
    ///
    /// The first cache refresh runs right away.
    pub async fn start(config: &AppConfig) -> Result<Self, ConnectionError> {
        info!(?config, "Starting order system");
        let topic = MemoryTopic::new(config.queue.topic.clone(), config.queue.capacity)?;

        let (tables, table_handles) = OrderTables::spawn(config.store.buffer_size);
        if let Err(e) = tables.ping().await {
            error!(error = %e, "Store unreachable");
            tables.close().await;
            return Err(e.into());
        }

        let store = Arc::new(RelationalStore::new(tables, config.store.write_policy));
        let cache = Arc::new(CacheVault::new(config.cache.limit));
        let manager = DataManager::new(store, cache);

        let workers = manager.spawn_workers(topic.subscribe(), config.cache.refresh_interval);
        let producer = topic.producer();

        info!(topic = topic.name(), "Order system started");
        Ok(Self {
            manager,
            producer,
            topic,
            workers,
            table_handles,
        })
    }

    pub fn topic(&self) -> &str {
        self.topic.name()
    }

    /// Stops the system.
    ///
    /// Sends the quit signal, waits for the ingestion loop to close the store,
    /// the cache vault and the consumer, then waits for every table task.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down order system");
        self.manager.quit();
        self.workers.join().await?;

        for handle in self.table_handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Table task failed");
                return Err(e);
            }
        }

        info!("Order system shutdown complete");
        Ok(())
    }
}
