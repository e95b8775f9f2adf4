use std::collections::{BTreeMap, BTreeSet};

use accrue_core::error::AccrueError;
use accrue_core::records::HolderStatus;
use accrue_core::types::{AccountId, Balance, Epoch};

use crate::log::DistributionLog;

// ── Staged settlement ─────────────────────────────────────────────────────────

/// Holder-status changes and history compactions staged by a settlement
/// before atomic commit. Dropping a batch discards every change in it.
#[derive(Debug, Default)]
pub struct SettlementBatch {
    pub(crate) statuses: BTreeMap<AccountId, HolderStatus>,
    pub(crate) compactions: Vec<(AccountId, Epoch)>,
    pub(crate) visited: BTreeSet<AccountId>,
    pub(crate) epochs_walked: u64,
}

impl SettlementBatch {
    /// Staged status of `holder`, if the settlement touched it.
    pub fn status(&self, holder: &AccountId) -> Option<&HolderStatus> {
        self.statuses.get(holder)
    }

    pub fn status_mut(&mut self, holder: &AccountId) -> Option<&mut HolderStatus> {
        self.statuses.get_mut(holder)
    }

    /// Staged cached amount of `holder` (0 if untouched).
    pub fn cached_amount(&self, holder: &AccountId) -> Balance {
        self.statuses.get(holder).map(|s| s.cached_amount).unwrap_or(0)
    }

    /// Number of distribution epochs visited across all walks in this batch.
    pub fn epochs_walked(&self) -> u64 {
        self.epochs_walked
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.compactions.is_empty()
    }
}

// ── Walk ──────────────────────────────────────────────────────────────────────

/// Result of walking one holder's unsettled epochs.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Walk {
    pub pending: Balance,
    /// Latest history entry at or before the walk's upper bound. Everything
    /// older can be compacted once the walk commits.
    pub anchor: Option<Epoch>,
    pub epochs: u64,
}

/// Accrue `floor(balance_i * amount_i / supply_i)` for every epoch `i` in
/// `next..=upper`, walking downward.
///
/// The history cursor only moves backward, so each history entry is visited
/// once per walk. Once no entry lies at or before the current epoch the walk
/// stops: the holder held nothing earlier.
pub(crate) fn walk(
    log: &DistributionLog,
    history: Option<&BTreeMap<Epoch, Balance>>,
    next: Epoch,
    upper: Epoch,
) -> Result<Walk, AccrueError> {
    let mut out = Walk::default();
    let Some(history) = history else {
        return Ok(out);
    };

    let mut cursor = history.range(..=upper).rev().peekable();
    out.anchor = cursor.peek().map(|(epoch, _)| **epoch);

    for epoch in (next..=upper).rev() {
        while let Some((entry_epoch, _)) = cursor.peek() {
            if **entry_epoch > epoch {
                cursor.next();
            } else {
                break;
            }
        }
        let Some((_, balance)) = cursor.peek() else {
            break;
        };
        out.epochs += 1;
        let balance = **balance;
        if balance == 0 {
            continue;
        }
        let record = log.get(epoch).ok_or_else(|| {
            AccrueError::Storage(format!("missing distribution record for epoch {}", epoch))
        })?;
        let share = record.share_of(balance).ok_or(AccrueError::ArithmeticOverflow)?;
        out.pending = out
            .pending
            .checked_add(share)
            .ok_or(AccrueError::ArithmeticOverflow)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(amounts: &[(Balance, Balance)]) -> DistributionLog {
        let mut log = DistributionLog::new();
        for (amount, supply) in amounts {
            log.announce(*amount, *supply, 0).unwrap();
        }
        log
    }

    #[test]
    fn per_epoch_floor_is_accumulated() {
        // One of three units, 5 paid per epoch: 1 + 1 = 2, not floor(10 / 3) = 3.
        let log = log_with(&[(5, 3), (5, 3)]);
        let history = BTreeMap::from([(0, 1)]);
        let w = walk(&log, Some(&history), 0, 1).unwrap();
        assert_eq!(w.pending, 2);
        assert_eq!(w.anchor, Some(0));
    }

    #[test]
    fn balance_changes_apply_from_their_epoch() {
        let log = log_with(&[(100, 10), (100, 10), (100, 10)]);
        let history = BTreeMap::from([(0, 1), (2, 5)]);
        let w = walk(&log, Some(&history), 0, 2).unwrap();
        assert_eq!(w.pending, 10 + 10 + 50);
        assert_eq!(w.anchor, Some(2));
        assert_eq!(w.epochs, 3);
    }

    #[test]
    fn walk_stops_before_first_entry() {
        let log = log_with(&[(100, 10); 6]);
        let history = BTreeMap::from([(4, 1)]);
        let w = walk(&log, Some(&history), 0, 5).unwrap();
        assert_eq!(w.pending, 20);
        assert_eq!(w.epochs, 2);
    }

    #[test]
    fn walk_includes_epoch_zero() {
        let log = log_with(&[(100, 10)]);
        let history = BTreeMap::from([(0, 1)]);
        let w = walk(&log, Some(&history), 0, 0).unwrap();
        assert_eq!(w.pending, 10);
    }

    #[test]
    fn entries_after_upper_bound_are_ignored() {
        let log = log_with(&[(100, 10), (100, 10)]);
        let history = BTreeMap::from([(0, 1), (2, 9)]);
        let w = walk(&log, Some(&history), 0, 1).unwrap();
        assert_eq!(w.pending, 20);
        assert_eq!(w.anchor, Some(0));
    }

    #[test]
    fn no_history_no_pending() {
        let log = log_with(&[(100, 10)]);
        assert_eq!(walk(&log, None, 0, 0).unwrap(), Walk::default());
    }
}
