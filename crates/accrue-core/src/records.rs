use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Balance, Epoch, Timestamp};

// ── DistributionRecord ────────────────────────────────────────────────────────

/// One payout announcement. Immutable once appended to the distribution log;
/// the supply snapshot is sealed so later mints and burns cannot change
/// past shares.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionRecord {
    pub epoch: Epoch,
    /// Distributed amount, 6 implied decimals.
    pub amount: Balance,
    /// Ledger total supply at announcement time.
    pub total_supply_snapshot: Balance,
    /// Announcement time.
    pub announced_at: Timestamp,
}

impl DistributionRecord {
    /// Floor share of this distribution owed to `balance`.
    pub fn share_of(&self, balance: Balance) -> Option<Balance> {
        if self.total_supply_snapshot == 0 {
            return Some(0);
        }
        balance
            .checked_mul(self.amount)
            .map(|n| n / self.total_supply_snapshot)
    }
}

// ── BalanceHistoryEntry ──────────────────────────────────────────────────────

/// A holder's ledger balance from `epoch` onward, until superseded by a
/// later entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceHistoryEntry {
    pub epoch: Epoch,
    pub balance: Balance,
}

// ── HolderStatus ─────────────────────────────────────────────────────────────

/// Per-holder lifecycle and settlement metadata.
///
/// Settlement cursor: when `is_cached` is false the next epoch to settle is
/// `last_settled_epoch` itself; when true, every epoch up to and including
/// `last_settled_epoch` is already folded into `cached_amount` (or into the
/// forwarding target's cache).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderStatus {
    pub is_frozen: bool,
    pub frozen_epoch: Epoch,
    pub frozen_timestamp: Timestamp,
    pub is_cached: bool,
    pub last_settled_epoch: Epoch,
    /// Settled, unclaimed entitlement (6 implied decimals).
    pub cached_amount: Balance,
    pub forward_to: Option<AccountId>,
    pub forwarded_from: Vec<AccountId>,
}

impl HolderStatus {
    /// A status created at `current_epoch`. Nothing before that epoch is
    /// ever walked for this holder.
    pub fn fresh(current_epoch: Epoch) -> Self {
        Self {
            is_frozen: false,
            frozen_epoch: 0,
            frozen_timestamp: 0,
            is_cached: false,
            last_settled_epoch: current_epoch,
            cached_amount: 0,
            forward_to: None,
            forwarded_from: Vec::new(),
        }
    }

    /// First epoch not yet settled.
    pub fn next_unsettled_epoch(&self) -> Epoch {
        if self.is_cached {
            self.last_settled_epoch + 1
        } else {
            self.last_settled_epoch
        }
    }

    /// Last epoch the holder may accrue for right now, or `None` when
    /// nothing is walkable (no announcements yet, or frozen at epoch 0).
    pub fn walk_upper_bound(&self, current_epoch: Epoch) -> Option<Epoch> {
        if self.is_frozen {
            self.frozen_epoch.checked_sub(1)
        } else {
            current_epoch.checked_sub(1)
        }
    }

    /// True when a settlement walk at `current_epoch` would be empty.
    pub fn is_settled_at(&self, current_epoch: Epoch) -> bool {
        match self.walk_upper_bound(current_epoch) {
            Some(upper) => upper < self.next_unsettled_epoch(),
            None => true,
        }
    }

    pub fn has_relationships(&self) -> bool {
        self.forward_to.is_some() || !self.forwarded_from.is_empty()
    }
}

// ── LockUpEntry ──────────────────────────────────────────────────────────────

/// A lot of balance units acquired at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockUpEntry {
    pub amount: Balance,
    pub acquired_at: Timestamp,
}
