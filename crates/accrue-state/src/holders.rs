use std::collections::BTreeMap;

use accrue_core::records::HolderStatus;
use accrue_core::types::{AccountId, Epoch};
use serde::{Deserialize, Serialize};

/// Per-holder lifecycle metadata, keyed by account.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderTable {
    statuses: BTreeMap<AccountId, HolderStatus>,
}

impl HolderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, holder: &AccountId) -> Option<&HolderStatus> {
        self.statuses.get(holder)
    }

    pub fn get_mut(&mut self, holder: &AccountId) -> Option<&mut HolderStatus> {
        self.statuses.get_mut(holder)
    }

    /// Existing status, or a fresh one created at `current_epoch`.
    pub fn get_or_fresh(&mut self, holder: &AccountId, current_epoch: Epoch) -> &mut HolderStatus {
        self.statuses
            .entry(*holder)
            .or_insert_with(|| HolderStatus::fresh(current_epoch))
    }

    pub fn insert(&mut self, holder: AccountId, status: HolderStatus) {
        self.statuses.insert(holder, status);
    }

    pub fn remove(&mut self, holder: &AccountId) -> Option<HolderStatus> {
        self.statuses.remove(holder)
    }

    pub fn contains(&self, holder: &AccountId) -> bool {
        self.statuses.contains_key(holder)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &HolderStatus)> {
        self.statuses.iter()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
