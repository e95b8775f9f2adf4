use std::path::Path;

use accrue_core::error::AccrueError;
use accrue_core::records::{DistributionRecord, HolderStatus};
use accrue_core::types::{AccountId, Balance, Epoch};

use crate::engine::DistributionEngine;
use crate::history::BalanceHistory;
use crate::holders::HolderTable;
use crate::log::DistributionLog;

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   distributions   epoch (u64 BE)              → bincode(DistributionRecord)
///   history         AccountId ‖ epoch (u64 BE)  → balance (u128 BE)
///   holders         AccountId bytes             → bincode(HolderStatus)
///   meta            utf8 key bytes              → raw bytes
pub struct StateDb {
    _db: sled::Db,
    distributions: sled::Tree,
    history: sled::Tree,
    holders: sled::Tree,
    meta: sled::Tree,
}

fn storage(e: sled::Error) -> AccrueError {
    AccrueError::Storage(e.to_string())
}

fn serialization(e: bincode::Error) -> AccrueError {
    AccrueError::Serialization(e.to_string())
}

fn history_key(holder: &AccountId, epoch: Epoch) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..32].copy_from_slice(holder.as_bytes());
    key[32..].copy_from_slice(&epoch.to_be_bytes());
    key
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N], AccrueError> {
    bytes
        .try_into()
        .map_err(|_| AccrueError::Storage(format!("malformed {} ({} bytes)", what, bytes.len())))
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AccrueError> {
        let db = sled::open(path).map_err(storage)?;
        let distributions = db.open_tree("distributions").map_err(storage)?;
        let history       = db.open_tree("history").map_err(storage)?;
        let holders       = db.open_tree("holders").map_err(storage)?;
        let meta          = db.open_tree("meta").map_err(storage)?;
        Ok(Self { _db: db, distributions, history, holders, meta })
    }

    /// True if no engine state has ever been saved.
    pub fn is_fresh(&self) -> Result<bool, AccrueError> {
        Ok(self.get_meta("initialized")?.is_none())
    }

    // ── Engine ───────────────────────────────────────────────────────────────

    /// Replace the stored engine state with `engine`.
    pub fn save_engine(&self, engine: &DistributionEngine) -> Result<(), AccrueError> {
        let mut batch = sled::Batch::default();
        for record in engine.log().records() {
            let bytes = bincode::serialize(record).map_err(serialization)?;
            batch.insert(record.epoch.to_be_bytes().to_vec(), bytes);
        }
        self.distributions.clear().map_err(storage)?;
        self.distributions.apply_batch(batch).map_err(storage)?;

        let mut batch = sled::Batch::default();
        for (holder, entries) in engine.history().iter() {
            for (epoch, balance) in entries {
                batch.insert(history_key(holder, *epoch).to_vec(), balance.to_be_bytes().to_vec());
            }
        }
        self.history.clear().map_err(storage)?;
        self.history.apply_batch(batch).map_err(storage)?;

        let mut batch = sled::Batch::default();
        for (holder, status) in engine.holders().iter() {
            let bytes = bincode::serialize(status).map_err(serialization)?;
            batch.insert(holder.as_bytes().to_vec(), bytes);
        }
        self.holders.clear().map_err(storage)?;
        self.holders.apply_batch(batch).map_err(storage)?;

        self.put_meta("initialized", b"1")
    }

    /// Load the stored engine state (empty engine on a fresh database).
    pub fn load_engine(&self) -> Result<DistributionEngine, AccrueError> {
        let mut records: Vec<DistributionRecord> = Vec::new();
        for item in self.distributions.iter() {
            let (_, bytes) = item.map_err(storage)?;
            records.push(bincode::deserialize(&bytes).map_err(serialization)?);
        }
        let log = DistributionLog::from_records(records)?;

        let mut history = BalanceHistory::new();
        for item in self.history.iter() {
            let (key, value) = item.map_err(storage)?;
            let key: [u8; 40] = fixed(&key, "history key")?;
            let holder = AccountId::from_bytes(fixed(&key[..32], "holder id")?);
            let epoch = Epoch::from_be_bytes(fixed(&key[32..], "epoch")?);
            let balance = Balance::from_be_bytes(fixed(&value, "balance")?);
            history.record(&holder, epoch, balance);
        }

        let mut holders = HolderTable::new();
        for item in self.holders.iter() {
            let (key, bytes) = item.map_err(storage)?;
            let holder = AccountId::from_bytes(fixed(&key, "holder id")?);
            let status: HolderStatus = bincode::deserialize(&bytes).map_err(serialization)?;
            holders.insert(holder, status);
        }

        Ok(DistributionEngine::from_parts(log, history, holders))
    }

    // ── Meta ──────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), AccrueError> {
        self.meta.insert(key.as_bytes(), value).map_err(storage)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, AccrueError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), AccrueError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}
