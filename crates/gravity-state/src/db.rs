use gravity_core::error::GravityError;
use gravity_core::types::Height;
use std::path::Path;

use crate::context::Context;

use crate::keys;

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   state — prefixed module keyspace (see `keys`), one logical KV store so a
///           whole proposal, height included, commits as a single atomic batch
pub struct StateDb {
    _db: sled::Db,
    state: sled::Tree,
}

fn storage(e: sled::Error) -> GravityError {
    GravityError::Storage(e.to_string())
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GravityError> {
        let db = sled::open(path).map_err(storage)?;
        Self::from_db(db)
    }

    /// In-memory database that is discarded on drop.
    pub fn open_temporary() -> Result<Self, GravityError> {
        let db = sled::Config::new().temporary(true).open().map_err(storage)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, GravityError> {
        let state = db.open_tree("state").map_err(storage)?;
        Ok(Self { _db: db, state })
    }

    /// Start a new write-buffered branch at the current height.
    pub fn begin(&self) -> Result<Context<'_>, GravityError> {
        Ok(Context::new(self, self.height()?))
    }

    /// True until anything has been committed.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    // ── Raw state access (used by Context) ───────────────────────────────────

    pub(crate) fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, GravityError> {
        self.state
            .get(key)
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    /// All committed entries under `prefix`, in ascending key order.
    pub(crate) fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, GravityError> {
        let mut out = Vec::new();
        for item in self.state.scan_prefix(prefix) {
            let (k, v) = item.map_err(storage)?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    /// Apply a batch atomically: either every write lands or none does.
    pub(crate) fn apply_batch(&self, batch: sled::Batch) -> Result<(), GravityError> {
        self.state.apply_batch(batch).map_err(storage)
    }

    // ── Height ────────────────────────────────────────────────────────────────

    pub fn height(&self) -> Result<Height, GravityError> {
        match self.get(keys::HEIGHT)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| GravityError::Serialization("corrupt height".into()))?;
                Ok(u64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), GravityError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}
