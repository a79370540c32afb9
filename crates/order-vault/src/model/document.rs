//! The composite order document, as it travels over the queue and is served to readers.

use serde::{Deserialize, Deserializer, Serialize};

/// The externally visible order: header fields plus the nested delivery,
/// payment and item list.
///
/// Decoding is lenient: absent keys take their zero value, and a `null` item
/// list reads as empty. Only malformed JSON and mistyped values are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDocument {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: DeliveryInfo,
    pub payment: PaymentInfo,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: String,
    pub oof_shard: String,
}

/// Delivery block of a document. Has no id of its own; the store assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryInfo {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment block of a document. Has no id of its own; the store assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInfo {
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

/// One line of an order. Stored as-is in the `items` relation, keyed by `chrt_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read request payload. Any extra fields are ignored, so a full document
/// also works as a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLookup {
    pub order_uid: String,
}

impl OrderLookup {
    pub fn new(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
        }
    }
}
