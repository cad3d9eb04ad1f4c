use gravity_core::error::GravityError;
use gravity_core::types::Height;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::db::StateDb;
use crate::keys;

/// A write-buffered branch of the `StateDb`.
///
/// Reads see the branch's own pending writes layered over committed state.
/// Nothing reaches disk until `commit`; dropping the context discards every
/// pending write. This is the transactional boundary proposal execution runs
/// inside.
pub struct Context<'a> {
    db: &'a StateDb,
    height: Height,
    /// key → Some(value) for a pending set, None for a pending delete.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(db: &'a StateDb, height: Height) -> Self {
        Self { db, height, writes: BTreeMap::new() }
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn with_height(mut self, height: Height) -> Self {
        self.height = height;
        self
    }

    // ── Raw KV ────────────────────────────────────────────────────────────────

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, GravityError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.db.get(key),
        }
    }

    pub fn has(&self, key: &[u8]) -> Result<bool, GravityError> {
        Ok(self.get(key)?.is_some())
    }

    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    /// Every live entry under `prefix`, pending writes included, in ascending
    /// key order with no duplicates.
    pub fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, GravityError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.db.scan_prefix(prefix)?.into_iter().collect();
        for (k, v) in self.writes.range(prefix.to_vec()..) {
            if !k.starts_with(prefix) {
                break;
            }
            match v {
                Some(value) => merged.insert(k.clone(), value.clone()),
                None => merged.remove(k),
            };
        }
        Ok(merged.into_iter().collect())
    }

    // ── Typed helpers ─────────────────────────────────────────────────────────

    pub fn get_typed<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, GravityError> {
        match self.get(key)? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)
                    .map_err(|e| GravityError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn set_typed<T: Serialize>(&mut self, key: Vec<u8>, value: &T) -> Result<(), GravityError> {
        let bytes = bincode::serialize(value)
            .map_err(|e| GravityError::Serialization(e.to_string()))?;
        self.set(key, bytes);
        Ok(())
    }

    pub fn get_u64(&self, key: &[u8]) -> Result<Option<u64>, GravityError> {
        match self.get(key)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    GravityError::Serialization(format!("expected 8 bytes under key {}", hex::encode(key)))
                })?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_u64(&mut self, key: Vec<u8>, value: u64) {
        self.set(key, value.to_be_bytes().to_vec());
    }

    pub fn get_u128(&self, key: &[u8]) -> Result<Option<u128>, GravityError> {
        match self.get(key)? {
            Some(bytes) => {
                let arr: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                    GravityError::Serialization(format!("expected 16 bytes under key {}", hex::encode(key)))
                })?;
                Ok(Some(u128::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_u128(&mut self, key: Vec<u8>, value: u128) {
        self.set(key, value.to_be_bytes().to_vec());
    }

    // ── Commit ────────────────────────────────────────────────────────────────

    /// Number of keys this branch would write or delete on commit.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Write every pending change and the branch height as one atomic batch.
    /// Returns the number of keys touched, not counting the height.
    pub fn commit(self) -> Result<usize, GravityError> {
        let touched = self.writes.len();
        let mut batch = sled::Batch::default();
        for (k, v) in self.writes {
            match v {
                Some(value) => batch.insert(k, value),
                None => batch.remove(k),
            }
        }
        batch.insert(keys::HEIGHT.to_vec(), self.height.to_be_bytes().to_vec());
        self.db.apply_batch(batch)?;
        debug!(keys = touched, height = self.height, "context committed");
        Ok(touched)
    }
}
