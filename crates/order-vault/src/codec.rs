//! # Document Codec
//!
//! JSON encoding of the composite document, the lookup payload and the bulk
//! payload (a JSON array of documents) exchanged between store and cache.

use crate::model::{OrderDocument, OrderLookup};
use thiserror::Error;

/// Errors raised while encoding or decoding payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input bytes are not a structurally valid payload.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization of a well-formed value failed.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The payload decoded but carries an empty `order_uid`.
    #[error("Document has an empty order_uid")]
    MissingOrderUid,
}

/// Decodes a composite document. Missing keys and `null` values decode to
/// zero values; an empty `order_uid` is rejected.
pub fn decode_document(bytes: &[u8]) -> Result<OrderDocument, CodecError> {
    let document: OrderDocument =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    if document.order_uid.is_empty() {
        return Err(CodecError::MissingOrderUid);
    }
    Ok(document)
}

pub fn encode_document(document: &OrderDocument) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(document).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a read request. Only `order_uid` is looked at.
pub fn decode_lookup(bytes: &[u8]) -> Result<OrderLookup, CodecError> {
    let lookup: OrderLookup =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    if lookup.order_uid.is_empty() {
        return Err(CodecError::MissingOrderUid);
    }
    Ok(lookup)
}

pub fn encode_lookup(lookup: &OrderLookup) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(lookup).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Encodes a list of documents as one JSON array.
pub fn encode_documents(documents: &[OrderDocument]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(documents).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode_documents(bytes: &[u8]) -> Result<Vec<OrderDocument>, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}
