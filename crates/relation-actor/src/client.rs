//! # Table Client
//!
//! The handle used to talk to a [`TableActor`](crate::TableActor).

use crate::error::TableError;
use crate::message::{RowFilter, TableRequest};
use crate::relation::Relation;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for one relation.
///
/// * **Cloneable**: holds only a sender, so cloning is inexpensive.
/// * **Async API**: every method resolves to `Result<_, TableError>`.
/// * **Generic**: works with any row type that implements [`Relation`].
pub struct TableClient<R: Relation> {
    sender: mpsc::Sender<TableRequest<R>>,
}

impl<R: Relation> Clone for TableClient<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<R: Relation> TableClient<R> {
    pub fn new(sender: mpsc::Sender<TableRequest<R>>) -> Self {
        Self { sender }
    }

    pub async fn insert(&self, row: R) -> Result<R::Key, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Insert { row, respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }

    pub async fn get(&self, key: R::Key) -> Result<Option<R>, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Get { key, respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }

    /// Returns every row for which `filter` holds.
    pub async fn find<F>(&self, filter: F) -> Result<Vec<R>, TableError>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.send_find(Some(Box::new(filter))).await
    }

    pub async fn find_all(&self) -> Result<Vec<R>, TableError> {
        self.send_find(None).await
    }

    async fn send_find(&self, filter: Option<RowFilter<R>>) -> Result<Vec<R>, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Find { filter, respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }

    pub async fn delete(&self, key: R::Key) -> Result<R, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Delete { key, respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }

    pub async fn count(&self) -> Result<usize, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Count { respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }

    /// Asks the table to stop. Resolves once the actor has acknowledged.
    pub async fn close(&self) -> Result<(), TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Close { respond_to })
            .await
            .map_err(|_| TableError::Closed)?;
        response.await.map_err(|_| TableError::Dropped)?
    }
}
