//! # Table Actor
//!
//! The task that owns the rows of one relation and serves requests sequentially.

use crate::client::TableClient;
use crate::error::TableError;
use crate::message::TableRequest;
use crate::relation::Relation;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns one relation.
///
/// **Concurrency Model**:
/// Each relation is served by its own loop, one message at a time. The `rows`
/// map therefore needs no `Mutex` or `RwLock`; exclusive ownership inside the
/// task is what keeps it consistent.
pub struct TableActor<R: Relation> {
    receiver: mpsc::Receiver<TableRequest<R>>,
    rows: HashMap<R::Key, R>,
}

impl<R: Relation> TableActor<R> {
    pub fn new(buffer_size: usize) -> (Self, TableClient<R>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            rows: HashMap::new(),
        };
        (actor, TableClient::new(sender))
    }

    /// Runs the table's event loop until a `Close` request arrives or every
    /// client has been dropped.
    pub async fn run(mut self) {
        let relation = R::NAME;
        info!(relation, "Table started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TableRequest::Insert { row, respond_to } => {
                    let key = row.key();
                    if self.rows.contains_key(&key) {
                        warn!(relation, %key, "Duplicate key");
                        let _ = respond_to.send(Err(TableError::Conflict {
                            relation,
                            key: key.to_string(),
                        }));
                        continue;
                    }
                    debug!(relation, ?row, "Insert");
                    self.rows.insert(key.clone(), row);
                    info!(relation, %key, size = self.rows.len(), "Inserted");
                    let _ = respond_to.send(Ok(key));
                }
                TableRequest::Get { key, respond_to } => {
                    let row = self.rows.get(&key).cloned();
                    debug!(relation, %key, found = row.is_some(), "Get");
                    let _ = respond_to.send(Ok(row));
                }
                TableRequest::Find { filter, respond_to } => {
                    let rows: Vec<R> = match filter {
                        Some(filter) => self.rows.values().filter(|row| filter(*row)).cloned().collect(),
                        None => self.rows.values().cloned().collect(),
                    };
                    debug!(relation, matched = rows.len(), "Find");
                    let _ = respond_to.send(Ok(rows));
                }
                TableRequest::Delete { key, respond_to } => match self.rows.remove(&key) {
                    Some(row) => {
                        info!(relation, %key, size = self.rows.len(), "Deleted");
                        let _ = respond_to.send(Ok(row));
                    }
                    None => {
                        warn!(relation, %key, "Not found");
                        let _ = respond_to.send(Err(TableError::NotFound {
                            relation,
                            key: key.to_string(),
                        }));
                    }
                },
                TableRequest::Count { respond_to } => {
                    let _ = respond_to.send(Ok(self.rows.len()));
                }
                TableRequest::Close { respond_to } => {
                    info!(relation, "Close requested");
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(relation, size = self.rows.len(), "Shutdown");
    }
}
