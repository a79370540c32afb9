//! # Table Messages
//!
//! The request enum sent from a [`TableClient`](crate::TableClient) to its [`TableActor`](crate::TableActor).

use crate::error::TableError;
use crate::relation::Relation;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by tables.
pub type Response<T> = oneshot::Sender<Result<T, TableError>>;

/// Predicate applied by a `Find` request. `None` selects every row.
pub type RowFilter<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// Internal message type sent to a table to request an operation.
///
/// The variants cover what a normalized store needs from one relation:
/// create a row, find a row by key or by filter, remove a row. `Count` and
/// `Close` exist for lifecycle management (liveness ping and shutdown).
pub enum TableRequest<R: Relation> {
    Insert {
        row: R,
        respond_to: Response<R::Key>,
    },
    Get {
        key: R::Key,
        respond_to: Response<Option<R>>,
    },
    Find {
        filter: Option<RowFilter<R>>,
        respond_to: Response<Vec<R>>,
    },
    Delete {
        key: R::Key,
        respond_to: Response<R>,
    },
    Count {
        respond_to: Response<usize>,
    },
    Close {
        respond_to: Response<()>,
    },
}
