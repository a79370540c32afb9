//! The four relations backing the store, and their lifecycle.

use crate::model::{Delivery, Item, OrderHeader, Payment};
use relation_actor::{TableActor, TableClient, TableError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Clients for the `orders`, `deliveries`, `payments` and `items` relations.
#[derive(Clone)]
pub struct OrderTables {
    pub orders: TableClient<OrderHeader>,
    pub deliveries: TableClient<Delivery>,
    pub payments: TableClient<Payment>,
    pub items: TableClient<Item>,
}

impl OrderTables {
    /// Spawns one table actor per relation.
    ///
    /// Returns the clients and the task handles, which complete once the
    /// tables are closed.
    pub fn spawn(buffer_size: usize) -> (Self, Vec<JoinHandle<()>>) {
        let (orders_actor, orders) = TableActor::new(buffer_size);
        let (deliveries_actor, deliveries) = TableActor::new(buffer_size);
        let (payments_actor, payments) = TableActor::new(buffer_size);
        let (items_actor, items) = TableActor::new(buffer_size);

        let handles = vec![
            tokio::spawn(orders_actor.run()),
            tokio::spawn(deliveries_actor.run()),
            tokio::spawn(payments_actor.run()),
            tokio::spawn(items_actor.run()),
        ];

        let tables = Self {
            orders,
            deliveries,
            payments,
            items,
        };
        (tables, handles)
    }

    /// Checks that every relation answers.
    pub async fn ping(&self) -> Result<(), TableError> {
        let orders = self.orders.count().await?;
        let deliveries = self.deliveries.count().await?;
        let payments = self.payments.count().await?;
        let items = self.items.count().await?;
        info!(orders, deliveries, payments, items, "Store reachable");
        Ok(())
    }

    /// Closes every relation. Failures are logged; closing continues.
    pub async fn close(&self) {
        let results = [
            ("orders", self.orders.close().await),
            ("deliveries", self.deliveries.close().await),
            ("payments", self.payments.close().await),
            ("items", self.items.close().await),
        ];
        for (relation, result) in results {
            if let Err(e) = result {
                warn!(relation, error = %e, "Close failed");
            }
        }
        info!("Connection to store closed");
    }
}
