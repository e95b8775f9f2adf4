use std::collections::BTreeMap;

use accrue_core::records::BalanceHistoryEntry;
use accrue_core::types::{AccountId, Balance, Epoch};
use serde::{Deserialize, Serialize};

/// Sparse per-holder balance history: for each holder, an ordered map from
/// the epoch a balance took effect to that balance.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceHistory {
    entries: BTreeMap<AccountId, BTreeMap<Epoch, Balance>>,
}

impl BalanceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `balance` for `holder` at `epoch`, overwriting any entry
    /// already written in that epoch. Returns true if a new entry was created.
    pub fn record(&mut self, holder: &AccountId, epoch: Epoch, balance: Balance) -> bool {
        self.entries
            .entry(*holder)
            .or_default()
            .insert(epoch, balance)
            .is_none()
    }

    pub fn entries_of(&self, holder: &AccountId) -> Option<&BTreeMap<Epoch, Balance>> {
        self.entries.get(holder)
    }

    pub fn history_of(&self, holder: &AccountId) -> Vec<BalanceHistoryEntry> {
        self.entries
            .get(holder)
            .map(|m| {
                m.iter()
                    .map(|(epoch, balance)| BalanceHistoryEntry { epoch: *epoch, balance: *balance })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Delete `holder`'s entries strictly older than `epoch`. The entry at
    /// `epoch` itself, the walk anchor, is kept. Returns the number removed.
    pub fn compact_older_than(&mut self, holder: &AccountId, epoch: Epoch) -> usize {
        let Some(map) = self.entries.get_mut(holder) else {
            return 0;
        };
        let keep = map.split_off(&epoch);
        let removed = map.len();
        *map = keep;
        removed
    }

    pub fn remove_holder(&mut self, holder: &AccountId) {
        self.entries.remove(holder);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &BTreeMap<Epoch, Balance>)> {
        self.entries.iter()
    }

    /// Total stored entries across all holders.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_epoch() {
        let mut h = BalanceHistory::new();
        let alice = AccountId::from_label("alice");
        assert!(h.record(&alice, 0, 2));
        assert!(!h.record(&alice, 0, 0));
        assert_eq!(h.history_of(&alice), vec![BalanceHistoryEntry { epoch: 0, balance: 0 }]);
    }

    #[test]
    fn compaction_keeps_anchor_and_later() {
        let mut h = BalanceHistory::new();
        let alice = AccountId::from_label("alice");
        for (e, b) in [(0, 1), (3, 2), (5, 3), (8, 4)] {
            h.record(&alice, e, b);
        }
        assert_eq!(h.compact_older_than(&alice, 5), 2);
        let epochs: Vec<_> = h.history_of(&alice).iter().map(|e| e.epoch).collect();
        assert_eq!(epochs, vec![5, 8]);
        assert_eq!(h.compact_older_than(&alice, 5), 0);
    }
}
