//! Normalized rows, one type per relation.
//!
//! Each type implements [`Relation`] so it can be held by a
//! [`TableActor`](relation_actor::TableActor).

use crate::model::Item;
use relation_actor::Relation;

/// Header row of the `orders` relation.
///
/// Delivery, payment and items are not embedded: the header points at them by
/// key. `item_ids` keeps the document order of the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHeader {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery_id: String,
    pub payment_id: String,
    pub item_ids: Vec<i64>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: String,
    pub oof_shard: String,
}

/// Row of the `deliveries` relation, owned by exactly one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivery_id: String,
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Row of the `payments` relation, owned by exactly one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: String,
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

impl Relation for OrderHeader {
    type Key = String;
    const NAME: &'static str = "orders";

    fn key(&self) -> String {
        self.order_uid.clone()
    }
}

impl Relation for Delivery {
    type Key = String;
    const NAME: &'static str = "deliveries";

    fn key(&self) -> String {
        self.delivery_id.clone()
    }
}

impl Relation for Payment {
    type Key = String;
    const NAME: &'static str = "payments";

    fn key(&self) -> String {
        self.payment_id.clone()
    }
}

// Items may be shared by several headers; nothing enforces ownership.
impl Relation for Item {
    type Key = i64;
    const NAME: &'static str = "items";

    fn key(&self) -> i64 {
        self.chrt_id
    }
}
