use crate::cache::CacheError;
use crate::codec::{decode_documents, decode_lookup, encode_document};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Whether a `set` created a new entry or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Inserted,
    Overwritten,
}

/// In-memory map from `order_uid` to the serialized composite document.
///
/// One readers/writer lock covers the whole map: lookups share it, every
/// mutation takes it exclusively. No guard is ever held across an `.await`.
///
/// Entries never expire on their own; the data manager's refresh loop clears
/// and rebuilds the vault on a timer. `capacity` is carried from configuration
/// but not enforced.
pub struct CacheVault {
    data: RwLock<HashMap<String, Vec<u8>>>,
    capacity: usize,
}

impl CacheVault {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let found = self.data.read().get(key).cloned();
        debug!(order_uid = key, hit = found.is_some(), "Cache lookup");
        found
    }

    /// Upserts `value` under `key`. Both outcomes store the same value.
    pub fn set(&self, key: impl Into<String>, value: Vec<u8>) -> SetOutcome {
        let key = key.into();
        let previous = self.data.write().insert(key.clone(), value);
        match previous {
            None => {
                info!(order_uid = %key, "Saved order in cache");
                SetOutcome::Inserted
            }
            Some(_) => {
                info!(order_uid = %key, "Rewrote cached order");
                SetOutcome::Overwritten
            }
        }
    }

    /// Upserts a serialized document, keyed by its own `order_uid`.
    pub fn set_document(&self, bytes: &[u8]) -> Result<SetOutcome, CacheError> {
        let lookup = decode_lookup(bytes).map_err(CacheError::InvalidDocument)?;
        Ok(self.set(lookup.order_uid, bytes.to_vec()))
    }

    /// Removes every entry and returns how many there were.
    pub fn clear_all(&self) -> usize {
        let evicted = {
            let mut data = self.data.write();
            let evicted = data.len();
            data.clear();
            evicted
        };
        info!(evicted, "Cleared cache");
        evicted
    }

    /// Loads every document of a bulk payload (a JSON array) and returns how
    /// many were stored.
    pub fn load_bulk(&self, bytes: &[u8]) -> Result<usize, CacheError> {
        let documents = decode_documents(bytes).map_err(CacheError::InvalidDocument)?;
        let mut loaded = 0;
        for document in &documents {
            match encode_document(document) {
                Ok(encoded) => {
                    self.set(document.order_uid.clone(), encoded);
                    loaded += 1;
                }
                Err(e) => warn!(order_uid = %document.order_uid, error = %e, "Skipping order"),
            }
        }
        let size = self.len();
        if size > self.capacity {
            warn!(size, capacity = self.capacity, "Cache holds more entries than its configured capacity");
        }
        info!(loaded, "Loaded orders to cache");
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quit signal: drops every entry.
    pub fn close(&self) {
        let evicted = self.clear_all();
        info!(evicted, "Cache vault closed");
    }
}
