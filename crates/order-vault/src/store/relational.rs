//! The relational [`OrderStore`]: one document spread over the `orders`,
//! `deliveries`, `payments` and `items` tables.
//!
//! Writes go delivery, payment, items, then the header, and every write is
//! attempted even after one fails. Reads start at the header and follow its
//! keys to the delivery, the items and then the payment. Nothing spans the
//! tables, so a concurrent reader may see a half-written order.

use crate::codec::{decode_document, decode_lookup, encode_documents, encode_lookup};
use crate::decompose::{decompose, reassemble, NormalizedOrder};
use crate::model::{Delivery, Item, OrderHeader, OrderLookup, Payment};
use crate::store::{
    Entity, EntityStatus, OrderStore, OrderTables, QueryResult, ReadResult, StoreError,
    WritePolicy, WriteResult,
};
use async_trait::async_trait;
use relation_actor::{Relation, TableError};
use tracing::{debug, info, instrument, warn};

/// [`OrderStore`] over the four relation tables.
pub struct RelationalStore {
    tables: OrderTables,
    policy: WritePolicy,
}

/// Keys inserted by one `create_order` call, for rollback.
#[derive(Default)]
struct Written {
    delivery: Option<String>,
    payment: Option<String>,
    items: Vec<i64>,
    order: Option<String>,
}

impl RelationalStore {
    pub fn new(tables: OrderTables, policy: WritePolicy) -> Self {
        Self { tables, policy }
    }

    pub fn tables(&self) -> &OrderTables {
        &self.tables
    }

    /// Deletes the rows a failed create managed to insert, header first.
    async fn roll_back(&self, written: Written, result: &mut QueryResult) {
        if let Some(key) = written.order {
            if let Err(e) = self.tables.orders.delete(key.clone()).await {
                result.errors.push(rollback_error::<OrderHeader>(key, e));
            }
        }
        for key in written.items.into_iter().rev() {
            if let Err(e) = self.tables.items.delete(key).await {
                result.errors.push(rollback_error::<Item>(key.to_string(), e));
            }
        }
        if let Some(key) = written.payment {
            if let Err(e) = self.tables.payments.delete(key.clone()).await {
                result.errors.push(rollback_error::<Payment>(key, e));
            }
        }
        if let Some(key) = written.delivery {
            if let Err(e) = self.tables.deliveries.delete(key.clone()).await {
                result.errors.push(rollback_error::<Delivery>(key, e));
            }
        }
        warn!("Rolled back partially written order");
    }
}

fn write_error<R: Relation>(key: impl ToString, source: TableError) -> StoreError {
    StoreError::Write {
        relation: R::NAME,
        key: key.to_string(),
        source,
    }
}

fn read_error<R: Relation>(key: impl ToString, source: TableError) -> StoreError {
    StoreError::Read {
        relation: R::NAME,
        key: key.to_string(),
        source,
    }
}

fn missing<R: Relation>(key: impl ToString) -> StoreError {
    StoreError::Missing {
        relation: R::NAME,
        key: key.to_string(),
    }
}

fn rollback_error<R: Relation>(key: String, source: TableError) -> StoreError {
    StoreError::Rollback {
        relation: R::NAME,
        key,
        source,
    }
}

#[async_trait]
impl OrderStore for RelationalStore {
    #[instrument(skip_all)]
    async fn create_order(&self, payload: &[u8]) -> WriteResult {
        let document = match decode_document(payload) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Rejected order document");
                return QueryResult::rejected(e);
            }
        };
        let order_uid = document.order_uid.clone();
        debug!(?document, "create_order called");

        let NormalizedOrder {
            header,
            delivery,
            payment,
            items,
        } = decompose(document);

        let mut result = QueryResult::default();
        let mut written = Written::default();

        let delivery_id = delivery.delivery_id.clone();
        match self.tables.deliveries.insert(delivery).await {
            Ok(key) => written.delivery = Some(key),
            Err(e) => {
                warn!(%order_uid, error = %e, "Can't create new row in deliveries table");
                result.record(
                    Entity::Delivery,
                    EntityStatus::CreateFailed,
                    write_error::<Delivery>(delivery_id, e),
                );
            }
        }

        let payment_id = payment.payment_id.clone();
        match self.tables.payments.insert(payment).await {
            Ok(key) => written.payment = Some(key),
            Err(e) => {
                warn!(%order_uid, error = %e, "Can't create new row in payments table");
                result.record(
                    Entity::Payment,
                    EntityStatus::CreateFailed,
                    write_error::<Payment>(payment_id, e),
                );
            }
        }

        for item in items {
            let chrt_id = item.chrt_id;
            match self.tables.items.insert(item).await {
                Ok(key) => written.items.push(key),
                Err(e) => {
                    warn!(%order_uid, chrt_id, error = %e, "Can't create new row in items table");
                    result.record(
                        Entity::Items,
                        EntityStatus::CreateFailed,
                        write_error::<Item>(chrt_id, e),
                    );
                }
            }
        }

        match self.tables.orders.insert(header).await {
            Ok(key) => written.order = Some(key),
            Err(e) => {
                warn!(%order_uid, error = %e, "Can't create new row in orders table");
                result.record(
                    Entity::Order,
                    EntityStatus::CreateFailed,
                    write_error::<OrderHeader>(&order_uid, e),
                );
            }
        }

        if result.is_success() {
            info!(%order_uid, "Added new order with payment, delivery and items");
            result.data = Some(payload.to_vec());
        } else {
            warn!(%order_uid, failures = result.errors.len(), "Order written partially");
            if self.policy == WritePolicy::Atomic {
                self.roll_back(written, &mut result).await;
            }
        }
        result
    }

    #[instrument(skip_all)]
    async fn get_order(&self, payload: &[u8]) -> ReadResult {
        let OrderLookup { order_uid } = match decode_lookup(payload) {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, "Rejected order lookup");
                return QueryResult::rejected(e);
            }
        };

        let mut result = QueryResult::default();

        let header = match self.tables.orders.get(order_uid.clone()).await {
            Ok(Some(header)) => header,
            Ok(None) => {
                warn!(%order_uid, "Can't find order with current order_uid");
                result.record(
                    Entity::Order,
                    EntityStatus::FindFailed,
                    missing::<OrderHeader>(&order_uid),
                );
                return result;
            }
            Err(e) => {
                warn!(%order_uid, error = %e, "Can't read orders table");
                result.record(
                    Entity::Order,
                    EntityStatus::FindFailed,
                    read_error::<OrderHeader>(&order_uid, e),
                );
                return result;
            }
        };

        let delivery = match self.tables.deliveries.get(header.delivery_id.clone()).await {
            Ok(Some(delivery)) => delivery,
            outcome => {
                let error = match outcome {
                    Err(e) => read_error::<Delivery>(&header.delivery_id, e),
                    _ => missing::<Delivery>(&header.delivery_id),
                };
                warn!(%order_uid, delivery_id = %header.delivery_id, "Can't find delivery");
                result.record(Entity::Delivery, EntityStatus::FindFailed, error);
                Delivery::default()
            }
        };

        let mut items = Vec::with_capacity(header.item_ids.len());
        for chrt_id in &header.item_ids {
            match self.tables.items.get(*chrt_id).await {
                Ok(Some(item)) => items.push(item),
                outcome => {
                    let error = match outcome {
                        Err(e) => read_error::<Item>(chrt_id, e),
                        _ => missing::<Item>(chrt_id),
                    };
                    warn!(%order_uid, chrt_id, "Can't find item");
                    result.record(Entity::Items, EntityStatus::FindFailed, error);
                }
            }
        }

        let payment = match self.tables.payments.get(header.payment_id.clone()).await {
            Ok(Some(payment)) => payment,
            outcome => {
                let error = match outcome {
                    Err(e) => read_error::<Payment>(&header.payment_id, e),
                    _ => missing::<Payment>(&header.payment_id),
                };
                warn!(%order_uid, payment_id = %header.payment_id, "Can't find payment");
                result.record(Entity::Payment, EntityStatus::FindFailed, error);
                Payment::default()
            }
        };

        match reassemble(&header, &delivery, &payment, &items) {
            Ok(bytes) => result.data = Some(bytes),
            Err(e) => {
                warn!(%order_uid, error = %e, "Marshaling order to JSON failed");
                result.errors.push(e.into());
            }
        }
        debug!(%order_uid, success = result.is_success(), "get_order done");
        result
    }

    #[instrument(skip_all)]
    async fn grep_all_orders(&self) -> ReadResult {
        let mut headers = match self.tables.orders.find_all().await {
            Ok(headers) => headers,
            Err(e) => {
                warn!(error = %e, "Failed on getting all rows in orders table");
                let mut result = QueryResult::default();
                result.record(
                    Entity::Order,
                    EntityStatus::FindFailed,
                    read_error::<OrderHeader>("*", e),
                );
                return result;
            }
        };
        headers.sort_by(|a, b| a.order_uid.cmp(&b.order_uid));

        // One full lookup per header.
        let mut documents = Vec::with_capacity(headers.len());
        for header in headers {
            let lookup = match encode_lookup(&OrderLookup::new(header.order_uid.clone())) {
                Ok(lookup) => lookup,
                Err(e) => {
                    warn!(order_uid = %header.order_uid, error = %e, "Skipping order");
                    continue;
                }
            };
            let fetched = self.get_order(&lookup).await;
            match (fetched.is_success(), fetched.data) {
                (true, Some(bytes)) => match decode_document(&bytes) {
                    Ok(document) => documents.push(document),
                    Err(e) => warn!(order_uid = %header.order_uid, error = %e, "Skipping order"),
                },
                _ => warn!(order_uid = %header.order_uid, "Skipping incomplete order"),
            }
        }

        match encode_documents(&documents) {
            Ok(bytes) => {
                info!(count = documents.len(), "Fetched all orders");
                QueryResult {
                    data: Some(bytes),
                    ..QueryResult::default()
                }
            }
            Err(e) => QueryResult::rejected(e),
        }
    }

    async fn close(&self) {
        self.tables.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_documents, encode_document};
    use crate::model::{DeliveryInfo, OrderDocument, PaymentInfo};
    use relation_actor::mock::{Journal, MockTable};

    fn item(chrt_id: i64) -> Item {
        Item {
            chrt_id,
            track_number: "WBILMTESTTRACK".to_string(),
            price: 453,
            rid: "ab4219087a764ae0btest".to_string(),
            name: "Mascaras".to_string(),
            sale: 30,
            size: "0".to_string(),
            total_price: 317,
            nm_id: 2389212,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
        }
    }

    fn document(order_uid: &str, items: Vec<Item>) -> OrderDocument {
        OrderDocument {
            order_uid: order_uid.to_string(),
            track_number: "WBILMTESTTRACK".to_string(),
            entry: "WBIL".to_string(),
            delivery: DeliveryInfo {
                name: "Test Testov".to_string(),
                city: "Kiryat Mozkin".to_string(),
                ..DeliveryInfo::default()
            },
            payment: PaymentInfo {
                transaction: order_uid.to_string(),
                currency: "USD".to_string(),
                amount: 1817,
                ..PaymentInfo::default()
            },
            items,
            locale: "en".to_string(),
            internal_signature: String::new(),
            customer_id: "test".to_string(),
            delivery_service: "meest".to_string(),
            shardkey: "9".to_string(),
            sm_id: 99,
            date_created: "2021-11-26T06:22:19Z".to_string(),
            oof_shard: "1".to_string(),
        }
    }

    fn lookup(order_uid: &str) -> Vec<u8> {
        encode_lookup(&OrderLookup::new(order_uid)).unwrap()
    }

    fn real_store(policy: WritePolicy) -> RelationalStore {
        let (tables, _handles) = OrderTables::spawn(16);
        RelationalStore::new(tables, policy)
    }

    struct Mocks {
        journal: Journal,
        orders: MockTable<OrderHeader>,
        deliveries: MockTable<Delivery>,
        payments: MockTable<Payment>,
        items: MockTable<Item>,
    }

    impl Mocks {
        fn new() -> Self {
            let journal = Journal::default();
            Self {
                orders: MockTable::with_journal(journal.clone()),
                deliveries: MockTable::with_journal(journal.clone()),
                payments: MockTable::with_journal(journal.clone()),
                items: MockTable::with_journal(journal.clone()),
                journal,
            }
        }

        /// Requests seen by the four mocks, in arrival order.
        fn journal(&self) -> Vec<String> {
            self.journal.lock().unwrap().clone()
        }

        fn store(&self, policy: WritePolicy) -> RelationalStore {
            let tables = OrderTables {
                orders: self.orders.client(),
                deliveries: self.deliveries.client(),
                payments: self.payments.client(),
                items: self.items.client(),
            };
            RelationalStore::new(tables, policy)
        }

        fn verify(&self) {
            self.orders.verify();
            self.deliveries.verify();
            self.payments.verify();
            self.items.verify();
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = real_store(WritePolicy::BestEffort);
        let doc = document("A1", vec![item(1)]);
        let payload = encode_document(&doc).unwrap();

        let written = store.create_order(&payload).await;
        assert!(written.is_success(), "{:?}", written.combined_error());
        assert_eq!(written.data.as_deref(), Some(payload.as_slice()));

        assert_eq!(store.tables().orders.count().await.unwrap(), 1);
        assert_eq!(store.tables().deliveries.count().await.unwrap(), 1);
        assert_eq!(store.tables().payments.count().await.unwrap(), 1);
        assert_eq!(store.tables().items.count().await.unwrap(), 1);

        let read = store.get_order(&lookup("A1")).await;
        assert!(read.is_success());
        assert_eq!(decode_document(&read.data.unwrap()).unwrap(), doc);
    }

    #[tokio::test]
    async fn test_malformed_create_touches_no_relation() {
        let mocks = Mocks::new();
        let store = mocks.store(WritePolicy::BestEffort);

        let result = store.create_order(b"{oops").await;
        assert!(!result.is_success());
        assert!(matches!(result.errors[0], StoreError::Codec(_)));
        assert_eq!(result.data, None);

        assert_eq!(mocks.deliveries.served(), 0);
        assert_eq!(mocks.payments.served(), 0);
        assert_eq!(mocks.items.served(), 0);
        assert_eq!(mocks.orders.served(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_remaining_writes() {
        let mut mocks = Mocks::new();
        mocks.deliveries.expect_insert().return_ok("d".to_string());
        mocks.payments.expect_insert().return_err(TableError::Closed);
        mocks.items.expect_insert().return_ok(1);
        mocks.items.expect_insert().return_err(TableError::Conflict {
            relation: "items",
            key: "2".to_string(),
        });
        mocks.orders.expect_insert().return_ok("A1".to_string());

        let store = mocks.store(WritePolicy::BestEffort);
        let payload = encode_document(&document("A1", vec![item(1), item(2)])).unwrap();
        let result = store.create_order(&payload).await;

        assert!(!result.is_success());
        assert_eq!(result.delivery, EntityStatus::Ok);
        assert_eq!(result.payment, EntityStatus::CreateFailed);
        assert_eq!(result.items, EntityStatus::CreateFailed);
        assert_eq!(result.order, EntityStatus::Ok);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.data, None);
        let combined = result.combined_error().unwrap();
        assert!(combined.contains("items table"));
        assert!(combined.contains("payments table"));
        assert_eq!(
            mocks.journal(),
            vec![
                "deliveries insert",
                "payments insert",
                "items insert",
                "items insert",
                "orders insert",
            ]
        );
        mocks.verify();
    }

    /// A rollback delete that fails is reported next to the write failure,
    /// and the remaining deletes still run.
    #[tokio::test]
    async fn test_failed_rollback_delete_is_reported() {
        let mut mocks = Mocks::new();
        mocks.deliveries.expect_insert().return_ok("d".to_string());
        mocks.payments.expect_insert().return_ok("p".to_string());
        mocks.items.expect_insert().return_ok(1);
        mocks.orders.expect_insert().return_err(TableError::Conflict {
            relation: "orders",
            key: "A1".to_string(),
        });
        mocks.items.expect_delete(1).return_err(TableError::Closed);
        mocks
            .payments
            .expect_delete("p".to_string())
            .return_ok(Payment::default());
        mocks
            .deliveries
            .expect_delete("d".to_string())
            .return_ok(Delivery::default());

        let store = mocks.store(WritePolicy::Atomic);
        let payload = encode_document(&document("A1", vec![item(1)])).unwrap();
        let result = store.create_order(&payload).await;

        assert!(!result.is_success());
        assert_eq!(result.order, EntityStatus::CreateFailed);
        assert_eq!(result.data, None);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.contains(&StoreError::Rollback {
            relation: "items",
            key: "1".to_string(),
            source: TableError::Closed,
        }));
        assert_eq!(
            mocks.journal(),
            vec![
                "deliveries insert",
                "payments insert",
                "items insert",
                "orders insert",
                "items delete",
                "payments delete",
                "deliveries delete",
            ]
        );
        mocks.verify();
    }

    #[tokio::test]
    async fn test_atomic_policy_deletes_rows_of_failed_create() {
        let store = real_store(WritePolicy::Atomic);
        let first = encode_document(&document("A1", vec![item(1)])).unwrap();
        assert!(store.create_order(&first).await.is_success());

        // Same order_uid again: header insert conflicts after the other rows went in
        let second = encode_document(&document("A1", vec![item(2)])).unwrap();
        let result = store.create_order(&second).await;
        assert_eq!(result.order, EntityStatus::CreateFailed);
        assert_eq!(result.delivery, EntityStatus::Ok);

        let tables = store.tables();
        assert_eq!(tables.deliveries.count().await.unwrap(), 1);
        assert_eq!(tables.payments.count().await.unwrap(), 1);
        assert_eq!(tables.items.count().await.unwrap(), 1);
        assert_eq!(tables.items.get(2).await.unwrap(), None);
        assert_eq!(tables.orders.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_policy_keeps_partial_rows() {
        let store = real_store(WritePolicy::BestEffort);
        let first = encode_document(&document("A1", vec![item(1)])).unwrap();
        assert!(store.create_order(&first).await.is_success());

        let second = encode_document(&document("A1", vec![item(2)])).unwrap();
        let result = store.create_order(&second).await;
        assert_eq!(result.order, EntityStatus::CreateFailed);

        let tables = store.tables();
        assert_eq!(tables.deliveries.count().await.unwrap(), 2);
        assert_eq!(tables.items.count().await.unwrap(), 2);
        assert_eq!(tables.orders.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_order_stops_after_header_lookup() {
        let mut mocks = Mocks::new();
        mocks.orders.expect_get("nope".to_string()).return_ok(None);
        let store = mocks.store(WritePolicy::BestEffort);

        let result = store.get_order(&lookup("nope")).await;
        assert!(!result.is_success());
        assert_eq!(result.order, EntityStatus::FindFailed);
        assert_eq!(result.data, None);
        assert_eq!(mocks.deliveries.served(), 0);
        assert_eq!(mocks.items.served(), 0);
        assert_eq!(mocks.payments.served(), 0);
        mocks.verify();
    }

    #[tokio::test]
    async fn test_get_skips_missing_items_and_reports_partial_data() {
        let mut mocks = Mocks::new();
        let normalized = decompose(document("A1", vec![item(1), item(2)]));
        let header = normalized.header.clone();

        mocks.orders.expect_get("A1".to_string()).return_ok(Some(header.clone()));
        mocks
            .deliveries
            .expect_get(header.delivery_id.clone())
            .return_err(TableError::Closed);
        mocks.items.expect_get(1).return_ok(Some(item(1)));
        mocks.items.expect_get(2).return_ok(None);
        mocks
            .payments
            .expect_get(header.payment_id.clone())
            .return_ok(Some(normalized.payment.clone()));

        let store = mocks.store(WritePolicy::BestEffort);
        let result = store.get_order(&lookup("A1")).await;

        assert!(!result.is_success());
        assert_eq!(result.order, EntityStatus::Ok);
        assert_eq!(result.delivery, EntityStatus::FindFailed);
        assert_eq!(result.items, EntityStatus::FindFailed);
        assert_eq!(result.payment, EntityStatus::Ok);

        let partial = decode_document(&result.data.unwrap()).unwrap();
        assert_eq!(partial.items, vec![item(1)]);
        assert_eq!(partial.delivery, DeliveryInfo::default());
        assert_eq!(partial.payment.amount, 1817);
        mocks.verify();
    }

    #[tokio::test]
    async fn test_get_reads_header_then_delivery_items_payment() {
        let mut mocks = Mocks::new();
        let normalized = decompose(document("A1", vec![item(1), item(2)]));
        let header = normalized.header.clone();

        mocks.orders.expect_get("A1".to_string()).return_ok(Some(header.clone()));
        mocks
            .deliveries
            .expect_get(header.delivery_id.clone())
            .return_ok(Some(normalized.delivery.clone()));
        mocks.items.expect_get(1).return_ok(Some(item(1)));
        mocks.items.expect_get(2).return_ok(Some(item(2)));
        mocks
            .payments
            .expect_get(header.payment_id.clone())
            .return_ok(Some(normalized.payment.clone()));

        let store = mocks.store(WritePolicy::BestEffort);
        let result = store.get_order(&lookup("A1")).await;

        assert!(result.is_success(), "{:?}", result.combined_error());
        assert_eq!(
            mocks.journal(),
            vec![
                "orders get",
                "deliveries get",
                "items get",
                "items get",
                "payments get",
            ]
        );
        mocks.verify();
    }

    #[tokio::test]
    async fn test_grep_all_orders_fans_out_per_header() {
        let store = real_store(WritePolicy::BestEffort);
        for (chrt_id, uid) in ["B2", "A1", "C3"].into_iter().enumerate() {
            let payload = encode_document(&document(uid, vec![item(chrt_id as i64)])).unwrap();
            assert!(store.create_order(&payload).await.is_success());
        }

        let result = store.grep_all_orders().await;
        assert!(result.is_success());
        let documents = decode_documents(&result.data.unwrap()).unwrap();
        let uids: Vec<&str> = documents.iter().map(|d| d.order_uid.as_str()).collect();
        assert_eq!(uids, vec!["A1", "B2", "C3"]);
    }

    #[tokio::test]
    async fn test_grep_all_orders_on_empty_store() {
        let store = real_store(WritePolicy::BestEffort);
        let result = store.grep_all_orders().await;
        assert!(result.is_success());
        assert_eq!(result.data.as_deref(), Some(b"[]".as_slice()));
    }
}
