use std::collections::BTreeMap;

use accrue_core::constants::DEFAULT_MIN_HOLD_SECS;
use accrue_core::error::AccrueError;
use accrue_core::types::{AccountId, Balance, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::queue::LockUpQueue;

/// Per-holder lock-up queues plus the minimum holding period they share.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockUpScheduler {
    min_hold_secs: i64,
    queues: BTreeMap<AccountId, LockUpQueue>,
}

impl Default for LockUpScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HOLD_SECS)
    }
}

impl LockUpScheduler {
    pub fn new(min_hold_secs: i64) -> Self {
        Self { min_hold_secs, queues: BTreeMap::new() }
    }

    pub fn min_hold_secs(&self) -> i64 {
        self.min_hold_secs
    }

    pub fn queue(&self, holder: &AccountId) -> Option<&LockUpQueue> {
        self.queues.get(holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = &AccountId> {
        self.queues.keys()
    }

    /// Lock `amount` incoming units for `holder`, acquired at `at`.
    pub fn lock(&mut self, holder: &AccountId, amount: Balance, at: Timestamp) -> Result<(), AccrueError> {
        if amount == 0 {
            return Ok(());
        }
        self.queues.entry(*holder).or_default().lock(amount, at)?;
        debug!(holder = %holder, amount, at, "locked acquisition lot");
        Ok(())
    }

    /// Release `amount` outgoing units from `holder`'s oldest lots.
    pub fn unlock(
        &mut self,
        holder: &AccountId,
        amount: Balance,
        now: Timestamp,
        ignore_min_hold: bool,
    ) -> Result<(), AccrueError> {
        if amount == 0 {
            return Ok(());
        }
        let queue = self
            .queues
            .get_mut(holder)
            .ok_or(AccrueError::InsufficientUnlockable { need: amount, have: 0 })?;
        queue.unlock(amount, now, self.min_hold_secs, ignore_min_hold)?;
        if queue.is_empty() {
            self.queues.remove(holder);
        }
        debug!(holder = %holder, amount, ignore_min_hold, "released lots");
        Ok(())
    }

    /// Units `holder` may move at `now`.
    pub fn available_unlocked(&self, holder: &AccountId, now: Timestamp) -> Balance {
        self.queues
            .get(holder)
            .map(|q| q.available_unlocked(now, self.min_hold_secs))
            .unwrap_or(0)
    }

    /// All units still tracked for `holder`, locked or not.
    pub fn tracked_total(&self, holder: &AccountId) -> Balance {
        self.queues.get(holder).map(LockUpQueue::total).unwrap_or(0)
    }
}
