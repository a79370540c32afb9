//! The tagged result returned by every store query.

use crate::store::StoreError;

/// Outcome of one entity (relation) within a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityStatus {
    #[default]
    Ok,
    CreateFailed,
    FindFailed,
}

impl EntityStatus {
    /// Numeric status code reported alongside the result.
    pub fn code(self) -> u16 {
        match self {
            EntityStatus::Ok => 0,
            EntityStatus::CreateFailed => 510,
            EntityStatus::FindFailed => 511,
        }
    }
}

/// The entity a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Order,
    Delivery,
    Payment,
    Items,
}

/// Result of a store query.
///
/// Failures do not short-circuit the remaining relations; each one flips the
/// status of its entity and is appended to `errors`. The query succeeded
/// only if nothing was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub order: EntityStatus,
    pub delivery: EntityStatus,
    pub payment: EntityStatus,
    pub items: EntityStatus,
    pub errors: Vec<StoreError>,
    pub data: Option<Vec<u8>>,
}

/// Result of `create_order`.
pub type WriteResult = QueryResult;

/// Result of `get_order` and `grep_all_orders`.
pub type ReadResult = QueryResult;

impl QueryResult {
    /// A result that failed before any relation was touched.
    pub fn rejected(error: impl Into<StoreError>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every recorded failure in one message, newest first.
    pub fn combined_error(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let messages: Vec<String> = self.errors.iter().rev().map(|e| e.to_string()).collect();
        Some(messages.join(" | "))
    }

    pub fn status(&self, entity: Entity) -> EntityStatus {
        match entity {
            Entity::Order => self.order,
            Entity::Delivery => self.delivery,
            Entity::Payment => self.payment,
            Entity::Items => self.items,
        }
    }

    pub(crate) fn record(&mut self, entity: Entity, status: EntityStatus, error: StoreError) {
        match entity {
            Entity::Order => self.order = status,
            Entity::Delivery => self.delivery = status,
            Entity::Payment => self.payment = status,
            Entity::Items => self.items = status,
        }
        self.errors.push(error);
    }
}
