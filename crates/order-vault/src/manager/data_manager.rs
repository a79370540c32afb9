//! The data manager and its two background loops.

use crate::cache::CacheVault;
use crate::codec::decode_lookup;
use crate::manager::Command;
use crate::queue::QueueConsumer;
use crate::store::OrderStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Routes commands to the store and the cache vault, and owns the background
/// loops that keep them fed.
pub struct DataManager<S: OrderStore> {
    store: Arc<S>,
    cache: Arc<CacheVault>,
    shutdown: CancellationToken,
}

impl<S: OrderStore> Clone for DataManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

/// Handles of the ingestion and refresh loops.
pub struct Workers {
    ingestion: JoinHandle<()>,
    refresh: JoinHandle<()>,
}

impl Workers {
    /// Waits for both loops to finish. They only finish after a quit signal.
    pub async fn join(self) -> Result<(), JoinError> {
        self.ingestion.await?;
        self.refresh.await?;
        Ok(())
    }
}

impl<S: OrderStore> DataManager<S> {
    pub fn new(store: Arc<S>, cache: Arc<CacheVault>) -> Self {
        info!(commands = ?Command::ALL.map(|c| c.name()), "Initialized data manager");
        Self {
            store,
            cache,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<CacheVault> {
        &self.cache
    }

    /// Runs a command given by its wire name. Unknown names yield `None`.
    pub async fn run_query(&self, name: &str, payload: &[u8]) -> Option<Vec<u8>> {
        match name.parse::<Command>() {
            Ok(command) => self.dispatch(command, payload).await,
            Err(e) => {
                warn!(error = %e, "Rejected query");
                None
            }
        }
    }

    /// Runs a command and returns the payload the store (or the cache) produced.
    pub async fn dispatch(&self, command: Command, payload: &[u8]) -> Option<Vec<u8>> {
        info!(%command, "Running query");
        match command {
            Command::CreateOrder => self.create_order(payload).await,
            Command::GetOrder => self.get_order(payload).await,
        }
    }

    async fn create_order(&self, payload: &[u8]) -> Option<Vec<u8>> {
        let result = self.store.create_order(payload).await;
        if result.is_success() {
            info!(command = "createOrder", "Query succeeded, saving result in cache");
            match self.cache.set_document(payload) {
                Ok(outcome) => info!(?outcome, "Saved query data in cache"),
                Err(e) => warn!(error = %e, "Failed to save query data in cache"),
            }
        } else {
            warn!(
                command = "createOrder",
                error = %result.combined_error().unwrap_or_default(),
                "Query failed"
            );
        }
        result.data
    }

    async fn get_order(&self, payload: &[u8]) -> Option<Vec<u8>> {
        let lookup = match decode_lookup(payload) {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, "Failed to decode order lookup");
                return None;
            }
        };

        if let Some(cached) = self.cache.get(&lookup.order_uid) {
            if !cached.is_empty() {
                info!(order_uid = %lookup.order_uid, "Got data from cache");
                return Some(cached);
            }
        }
        info!(order_uid = %lookup.order_uid, "Cache miss, reading from store");

        let result = self.store.get_order(payload).await;
        if result.is_success() {
            if let Some(data) = &result.data {
                self.cache.set(lookup.order_uid, data.clone());
            }
        } else {
            warn!(
                order_uid = %lookup.order_uid,
                error = %result.combined_error().unwrap_or_default(),
                "Store read incomplete"
            );
        }
        result.data
    }

    /// Flushes the cache and reloads it with every order in the store.
    ///
    /// Returns how many orders were loaded. Between the flush and the reload
    /// readers see misses and fall through to the store. A quit signal
    /// abandons the reload, so nothing is loaded into a closed vault.
    pub async fn refresh_cache(&self) -> usize {
        if self.is_quitting() {
            return 0;
        }
        info!("Reloading cache from store");
        self.cache.clear_all();

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("Quit during cache reload, nothing loaded");
                return 0;
            }
            result = self.store.grep_all_orders() => result,
        };
        let Some(bulk) = result.data else {
            warn!(
                error = %result.combined_error().unwrap_or_default(),
                "Could not read orders for cache reload"
            );
            return 0;
        };
        match self.cache.load_bulk(&bulk) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Could not load orders to cache");
                0
            }
        }
    }

    /// Starts the ingestion loop over `consumer` and the cache refresh loop.
    ///
    /// The first refresh runs immediately. Both loops stop after [`quit`](Self::quit).
    pub fn spawn_workers<C: QueueConsumer>(&self, consumer: C, refresh_interval: Duration) -> Workers {
        let (refresh_alive, refresh_stopped) = oneshot::channel();
        let refresh = tokio::spawn(self.clone().refresh(refresh_interval, refresh_alive));
        let ingestion = tokio::spawn(self.clone().ingest(consumer, refresh_stopped));
        Workers { ingestion, refresh }
    }

    /// Signals both loops to stop. Once the refresh loop is gone, the ingestion
    /// loop closes the store, the cache vault and the consumer, in that order.
    pub fn quit(&self) {
        info!("Quit signal sent to data manager");
        self.shutdown.cancel();
    }

    pub fn is_quitting(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    async fn ingest<C: QueueConsumer>(self, mut consumer: C, refresh_stopped: oneshot::Receiver<()>) {
        info!("Ingestion loop started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                message = consumer.recv() => match message {
                    Some(payload) => {
                        info!(bytes = payload.len(), "Received message from queue, starting processing");
                        let outcome = if self.dispatch(Command::CreateOrder, &payload).await.is_some() {
                            "stored"
                        } else {
                            "rejected"
                        };
                        info!(outcome, "Processed queued order");
                    }
                    None => {
                        warn!("Queue closed, waiting for quit signal");
                        self.shutdown.cancelled().await;
                        break;
                    }
                },
            }
        }

        // Resolves when the refresh loop drops its sender
        let _ = refresh_stopped.await;

        self.store.close().await;
        self.cache.close();
        consumer.close().await;
        info!("Closed store, cache vault and consumer");
    }

    /// `_alive` is held until the loop returns.
    async fn refresh(self, period: Duration, _alive: oneshot::Sender<()>) {
        // interval() panics on a zero period
        let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "Cache refresh loop started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.refresh_cache().await;
                }
            }
        }
        info!("Cache refresh loop stopped");
    }
}
