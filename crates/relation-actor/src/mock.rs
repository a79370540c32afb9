//! # Mock Tables
//!
//! [`MockTable<R>`] hands out a real [`TableClient<R>`], but the requests it sends
//! are answered from a queue of expectations instead of a running [`TableActor`](crate::TableActor).
//!
//! ## When to use a mock vs a real table
//!
//! | Feature | MockTable | TableActor |
//! |---------|-----------|------------|
//! | **State** | None (scripted answers) | Real rows |
//! | **Error Injection** | Easy (`return_err`) | Only conflicts and not-found |
//! | **Use Case** | Code *around* a relation (store adapters) | The relation itself, full system tests |
//!
//! ## Failure injection
//!
//! ```rust
//! use relation_actor::mock::MockTable;
//! use relation_actor::{Relation, TableError};
//!
//! #[derive(Clone, Debug)]
//! struct Delivery { delivery_id: String }
//! impl Relation for Delivery {
//!     type Key = String;
//!     const NAME: &'static str = "deliveries";
//!     fn key(&self) -> String { self.delivery_id.clone() }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockTable::<Delivery>::new();
//!     mock.expect_insert().return_err(TableError::Closed);
//!
//!     let client = mock.client();
//!     let result = client.insert(Delivery { delivery_id: "d1".into() }).await;
//!     assert!(matches!(result, Err(TableError::Closed)));
//!     mock.verify();
//! }
//! ```
//!
//! Requests must arrive in the order the expectations were queued. A request that
//! does not match the next expectation panics the mock task, which the caller sees
//! as [`TableError::Dropped`].
//!
//! ## Ordering across relations
//!
//! Each mock only checks the order of its own requests. Mocks built with
//! [`MockTable::with_journal`] over one shared [`Journal`] also append a line such
//! as `"items get"` for every row-level request, so a test can pin the sequence
//! in which several relations were touched.

use crate::client::TableClient;
use crate::error::TableError;
use crate::message::TableRequest;
use crate::relation::Relation;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation<R: Relation> {
    Insert {
        response: Result<R::Key, TableError>,
    },
    Get {
        key: R::Key,
        response: Result<Option<R>, TableError>,
    },
    Find {
        response: Result<Vec<R>, TableError>,
    },
    Delete {
        key: R::Key,
        response: Result<R, TableError>,
    },
}

type Expectations<R> = Arc<Mutex<VecDeque<Expectation<R>>>>;

/// Shared log of `"<relation> <op>"` lines, one per row-level request.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// A scripted relation with expectation tracking.
///
/// `Count` and `Close` requests are always answered with `Ok` and do not
/// consume expectations.
pub struct MockTable<R: Relation> {
    client: TableClient<R>,
    expectations: Expectations<R>,
    served: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<R: Relation> Default for MockTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Relation> MockTable<R> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::spawn(None)
    }

    /// Creates a new mock that records every row-level request in `journal`.
    pub fn with_journal(journal: Journal) -> Self {
        Self::spawn(Some(journal))
    }

    fn spawn(journal: Option<Journal>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<TableRequest<R>>(100);
        let expectations: Expectations<R> = Arc::new(Mutex::new(VecDeque::new()));
        let served = Arc::new(AtomicUsize::new(0));
        let expectations_clone = expectations.clone();
        let served_clone = served.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let request = match request {
                    TableRequest::Count { respond_to } => {
                        let _ = respond_to.send(Ok(0));
                        continue;
                    }
                    TableRequest::Close { respond_to } => {
                        let _ = respond_to.send(Ok(()));
                        continue;
                    }
                    other => other,
                };

                if let Some(journal) = &journal {
                    let op = match &request {
                        TableRequest::Insert { .. } => "insert",
                        TableRequest::Get { .. } => "get",
                        TableRequest::Find { .. } => "find",
                        _ => "delete",
                    };
                    journal.lock().unwrap().push(format!("{} {}", R::NAME, op));
                }

                let expectation = expectations_clone.lock().unwrap().pop_front();
                served_clone.fetch_add(1, Ordering::SeqCst);

                match (request, expectation) {
                    (TableRequest::Insert { respond_to, .. }, Some(Expectation::Insert { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (TableRequest::Get { key, respond_to }, Some(Expectation::Get { key: expected, response })) => {
                        assert_eq!(key, expected, "Get for unexpected key in {}", R::NAME);
                        let _ = respond_to.send(response);
                    }
                    (TableRequest::Find { respond_to, .. }, Some(Expectation::Find { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (TableRequest::Delete { key, respond_to }, Some(Expectation::Delete { key: expected, response })) => {
                        assert_eq!(key, expected, "Delete for unexpected key in {}", R::NAME);
                        let _ = respond_to.send(response);
                    }
                    _ => panic!("Unexpected request or expectation mismatch in {}", R::NAME),
                }
            }
        });

        Self {
            client: TableClient::new(sender),
            expectations,
            served,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> TableClient<R> {
        self.client.clone()
    }

    /// Number of row-level requests (insert, get, find, delete) served so far.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<R, R::Key> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Insert { response })
    }

    pub fn expect_get(&mut self, key: R::Key) -> ExpectationBuilder<R, Option<R>> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Get {
            key: key.clone(),
            response,
        })
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<R, Vec<R>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Find { response })
    }

    pub fn expect_delete(&mut self, key: R::Key) -> ExpectationBuilder<R, R> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Delete {
            key: key.clone(),
            response,
        })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder that queues the answer for one expected request.
pub struct ExpectationBuilder<R: Relation, T> {
    expectations: Expectations<R>,
    make: Box<dyn Fn(Result<T, TableError>) -> Expectation<R> + Send>,
}

impl<R: Relation, T> ExpectationBuilder<R, T> {
    fn new(
        expectations: Expectations<R>,
        make: impl Fn(Result<T, TableError>) -> Expectation<R> + Send + 'static,
    ) -> Self {
        Self {
            expectations,
            make: Box::new(make),
        }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TableError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, TableError>) {
        let expectation = (self.make)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}
