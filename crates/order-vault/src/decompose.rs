//! # Decomposer / Reassembler
//!
//! Pure transforms between an [`OrderDocument`] and its normalized rows.
//! No I/O happens here; the store adapter decides what to do with the rows.

use crate::codec::{encode_document, CodecError};
use crate::model::{
    Delivery, DeliveryInfo, Item, OrderDocument, OrderHeader, Payment, PaymentInfo,
};
use rand::Rng;

const ID_LEN: usize = 16;
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The four kinds of rows produced from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOrder {
    pub header: OrderHeader,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
}

/// Generates a synthetic row id: 16 random ASCII letters.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Splits a document into header, delivery, payment and item rows.
///
/// Delivery and payment get fresh synthetic ids. Items are copied verbatim and
/// referenced from the header by `chrt_id`, in document order.
pub fn decompose(document: OrderDocument) -> NormalizedOrder {
    let OrderDocument {
        order_uid,
        track_number,
        entry,
        delivery,
        payment,
        items,
        locale,
        internal_signature,
        customer_id,
        delivery_service,
        shardkey,
        sm_id,
        date_created,
        oof_shard,
    } = document;

    let delivery = Delivery {
        delivery_id: generate_id(),
        name: delivery.name,
        phone: delivery.phone,
        zip: delivery.zip,
        city: delivery.city,
        address: delivery.address,
        region: delivery.region,
        email: delivery.email,
    };
    let payment = Payment {
        payment_id: generate_id(),
        transaction: payment.transaction,
        request_id: payment.request_id,
        currency: payment.currency,
        provider: payment.provider,
        amount: payment.amount,
        payment_dt: payment.payment_dt,
        bank: payment.bank,
        delivery_cost: payment.delivery_cost,
        goods_total: payment.goods_total,
        custom_fee: payment.custom_fee,
    };

    let header = OrderHeader {
        order_uid,
        track_number,
        entry,
        delivery_id: delivery.delivery_id.clone(),
        payment_id: payment.payment_id.clone(),
        item_ids: items.iter().map(|item| item.chrt_id).collect(),
        locale,
        internal_signature,
        customer_id,
        delivery_service,
        shardkey,
        sm_id,
        date_created,
        oof_shard,
    };

    NormalizedOrder {
        header,
        delivery,
        payment,
        items,
    }
}

/// Rebuilds the composite document from looked-up rows.
///
/// Items are emitted in the header's reference order; references with no
/// matching row in `items` are left out.
pub fn reassemble_document(
    header: &OrderHeader,
    delivery: &Delivery,
    payment: &Payment,
    items: &[Item],
) -> OrderDocument {
    let ordered_items = header
        .item_ids
        .iter()
        .filter_map(|id| items.iter().find(|item| item.chrt_id == *id))
        .cloned()
        .collect();

    OrderDocument {
        order_uid: header.order_uid.clone(),
        track_number: header.track_number.clone(),
        entry: header.entry.clone(),
        delivery: DeliveryInfo {
            name: delivery.name.clone(),
            phone: delivery.phone.clone(),
            zip: delivery.zip.clone(),
            city: delivery.city.clone(),
            address: delivery.address.clone(),
            region: delivery.region.clone(),
            email: delivery.email.clone(),
        },
        payment: PaymentInfo {
            transaction: payment.transaction.clone(),
            request_id: payment.request_id.clone(),
            currency: payment.currency.clone(),
            provider: payment.provider.clone(),
            amount: payment.amount,
            payment_dt: payment.payment_dt,
            bank: payment.bank.clone(),
            delivery_cost: payment.delivery_cost,
            goods_total: payment.goods_total,
            custom_fee: payment.custom_fee,
        },
        items: ordered_items,
        locale: header.locale.clone(),
        internal_signature: header.internal_signature.clone(),
        customer_id: header.customer_id.clone(),
        delivery_service: header.delivery_service.clone(),
        shardkey: header.shardkey.clone(),
        sm_id: header.sm_id,
        date_created: header.date_created.clone(),
        oof_shard: header.oof_shard.clone(),
    }
}

/// [`reassemble_document`] followed by the final encode step.
pub fn reassemble(
    header: &OrderHeader,
    delivery: &Delivery,
    payment: &Payment,
    items: &[Item],
) -> Result<Vec<u8>, CodecError> {
    encode_document(&reassemble_document(header, delivery, payment, items))
}
