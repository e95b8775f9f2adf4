use std::collections::btree_map::Entry;

use accrue_core::error::AccrueError;
use accrue_core::interfaces::BalanceLedger;
use accrue_core::records::{BalanceHistoryEntry, DistributionRecord, HolderStatus};
use accrue_core::types::{AccountId, Balance, Epoch, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::history::BalanceHistory;
use crate::holders::HolderTable;
use crate::log::DistributionLog;
use crate::settlement::{self, SettlementBatch};

// ── DistributionEngine ───────────────────────────────────────────────────────

/// The lazy-settlement accounting engine.
///
/// Owns the distribution log, the sparse balance history, and the holder
/// status table. The balance ledger is a read-only collaborator passed into
/// the operations that need it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionEngine {
    log: DistributionLog,
    history: BalanceHistory,
    holders: HolderTable,
}

impl DistributionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(log: DistributionLog, history: BalanceHistory, holders: HolderTable) -> Self {
        Self { log, history, holders }
    }

    pub fn log(&self) -> &DistributionLog {
        &self.log
    }

    pub fn history(&self) -> &BalanceHistory {
        &self.history
    }

    pub fn holders(&self) -> &HolderTable {
        &self.holders
    }

    pub fn current_epoch(&self) -> Epoch {
        self.log.current_epoch()
    }

    pub fn distribution(&self, epoch: Epoch) -> Option<&DistributionRecord> {
        self.log.get(epoch)
    }

    pub fn status(&self, holder: &AccountId) -> Option<&HolderStatus> {
        self.holders.get(holder)
    }

    pub fn history_of(&self, holder: &AccountId) -> Vec<BalanceHistoryEntry> {
        self.history.history_of(holder)
    }

    pub fn is_frozen(&self, holder: &AccountId) -> bool {
        self.holders.get(holder).map(|s| s.is_frozen).unwrap_or(false)
    }

    // ── Distribution log ──────────────────────────────────────────────────────

    /// Seal the current epoch with `amount` against the ledger's present
    /// total supply. Every holder's pending window now includes it.
    pub fn announce(
        &mut self,
        ledger: &dyn BalanceLedger,
        amount: Balance,
        now: Timestamp,
    ) -> Result<Epoch, AccrueError> {
        let total_supply = ledger.total_supply();
        let epoch = self.log.announce(amount, total_supply, now)?;
        info!(epoch, amount, total_supply, "distribution announced");
        Ok(epoch)
    }

    // ── Balance history ───────────────────────────────────────────────────────

    /// Snapshot `holder`'s balance at the current epoch.
    pub fn record_balance(&mut self, holder: &AccountId, balance: Balance) {
        if holder.is_null() {
            return;
        }
        let epoch = self.current_epoch();
        self.holders.get_or_fresh(holder, epoch);
        self.history.record(holder, epoch, balance);
    }

    /// Ledger notification hook: called after every balance change.
    pub fn on_balance_change(&mut self, ledger: &dyn BalanceLedger, from: &AccountId, to: &AccountId) {
        for holder in [from, to] {
            if !holder.is_null() {
                self.record_balance(holder, ledger.balance_of(holder));
            }
        }
    }

    // ── Settlement ────────────────────────────────────────────────────────────

    /// Compute `holder`'s settlement without touching committed state.
    ///
    /// Accounts forwarding into `holder` are settled first so their credit is
    /// folded into its cache. The returned batch is applied with `commit`.
    pub fn stage_settlement(&self, holder: &AccountId) -> Result<SettlementBatch, AccrueError> {
        let mut batch = SettlementBatch::default();
        self.stage_into(&mut batch, holder)?;
        Ok(batch)
    }

    fn stage_into(&self, batch: &mut SettlementBatch, holder: &AccountId) -> Result<(), AccrueError> {
        if !batch.visited.insert(*holder) {
            return Ok(());
        }
        let forwarders = match self.staged(batch, holder) {
            Some(status) => status.forwarded_from.clone(),
            None => return Ok(()),
        };
        for forwarder in &forwarders {
            self.stage_into(batch, forwarder)?;
        }

        let current = self.current_epoch();
        let (next, upper, forward_to) = {
            let Some(status) = batch.statuses.get(holder) else {
                return Ok(());
            };
            let Some(upper) = status.walk_upper_bound(current) else {
                return Ok(());
            };
            let next = status.next_unsettled_epoch();
            if upper < next {
                return Ok(());
            }
            (next, upper, status.forward_to)
        };

        let walk = settlement::walk(&self.log, self.history.entries_of(holder), next, upper)?;
        batch.epochs_walked += walk.epochs;

        let beneficiary = forward_to.unwrap_or(*holder);
        let credited = self.staged_or_fresh(batch, &beneficiary);
        credited.cached_amount = credited
            .cached_amount
            .checked_add(walk.pending)
            .ok_or(AccrueError::ArithmeticOverflow)?;

        if let Some(status) = batch.statuses.get_mut(holder) {
            status.last_settled_epoch = upper;
            status.is_cached = true;
        }
        if let Some(anchor) = walk.anchor {
            batch.compactions.push((*holder, anchor));
        }
        debug!(
            holder = %holder,
            from = next,
            to = upper,
            pending = walk.pending,
            beneficiary = %beneficiary,
            "settled epochs"
        );
        Ok(())
    }

    /// Staged copy of `holder`'s status, pulled from the table on first use.
    fn staged<'b>(&self, batch: &'b mut SettlementBatch, holder: &AccountId) -> Option<&'b mut HolderStatus> {
        match batch.statuses.entry(*holder) {
            Entry::Occupied(e) => Some(e.into_mut()),
            Entry::Vacant(e) => self.holders.get(holder).map(|s| e.insert(s.clone())),
        }
    }

    fn staged_or_fresh<'b>(&self, batch: &'b mut SettlementBatch, holder: &AccountId) -> &'b mut HolderStatus {
        let current = self.current_epoch();
        batch.statuses.entry(*holder).or_insert_with(|| {
            self.holders
                .get(holder)
                .cloned()
                .unwrap_or_else(|| HolderStatus::fresh(current))
        })
    }

    /// Apply a staged batch.
    pub fn commit(&mut self, batch: SettlementBatch) {
        for (holder, status) in batch.statuses {
            self.holders.insert(holder, status);
        }
        for (holder, anchor) in batch.compactions {
            let removed = self.history.compact_older_than(&holder, anchor);
            if removed > 0 {
                debug!(holder = %holder, anchor, removed, "compacted balance history");
            }
        }
    }

    /// Settle `holder` up to the present and return its cached entitlement.
    ///
    /// This commits: a query for the pending amount is also the act of
    /// settling it.
    pub fn settle(&mut self, holder: &AccountId) -> Result<Balance, AccrueError> {
        let batch = self.stage_settlement(holder)?;
        let pending = batch.cached_amount(holder);
        self.commit(batch);
        Ok(pending)
    }

    // ── Freeze / unfreeze ─────────────────────────────────────────────────────

    /// Freeze `holder` at the current epoch. Returns false if already frozen.
    pub fn freeze(&mut self, holder: &AccountId, now: Timestamp) -> Result<bool, AccrueError> {
        if holder.is_null() {
            return Err(AccrueError::InvalidTarget);
        }
        let epoch = self.current_epoch();
        let status = self.holders.get_or_fresh(holder, epoch);
        if status.is_frozen {
            return Ok(false);
        }
        status.is_frozen = true;
        status.frozen_epoch = epoch;
        status.frozen_timestamp = now;
        info!(holder = %holder, epoch, "holder frozen");
        Ok(true)
    }

    /// Lift a freeze. Entitlement up to the frozen cutoff is settled; epochs
    /// announced while frozen are skipped and accrual resumes from the
    /// current epoch. A status left with nothing to track is deleted.
    /// Returns false if the holder was not frozen.
    pub fn unfreeze(&mut self, ledger: &dyn BalanceLedger, holder: &AccountId) -> Result<bool, AccrueError> {
        if !self.is_frozen(holder) {
            return Ok(false);
        }
        let mut batch = self.stage_settlement(holder)?;
        let current = self.current_epoch();
        if let Some(status) = batch.status_mut(holder) {
            status.is_frozen = false;
            status.frozen_epoch = 0;
            status.frozen_timestamp = 0;
            status.last_settled_epoch = current;
            status.is_cached = false;
        }
        self.commit(batch);
        self.prune_if_empty(ledger, holder);
        info!(holder = %holder, epoch = current, "holder unfrozen");
        Ok(true)
    }

    // ── Forwarding ────────────────────────────────────────────────────────────

    /// Redirect `holder`'s future accrual to `target`.
    ///
    /// The holder is settled under its existing arrangement first, so every
    /// epoch already announced keeps its beneficiary.
    pub fn set_forward(
        &mut self,
        ledger: &dyn BalanceLedger,
        holder: &AccountId,
        target: &AccountId,
    ) -> Result<(), AccrueError> {
        if holder.is_null() || target.is_null() || holder == target {
            return Err(AccrueError::InvalidTarget);
        }
        if self.holders.get(holder).and_then(|s| s.forward_to) == Some(*target) {
            return Ok(());
        }
        if self.forwards_into(target, holder) {
            return Err(AccrueError::InvalidTarget);
        }

        let mut batch = self.stage_settlement(holder)?;
        let previous = self.staged_or_fresh(&mut batch, holder).forward_to.take();
        if let Some(old) = previous {
            if let Some(old_status) = self.staged(&mut batch, &old) {
                detach(old_status, holder);
            }
        }
        self.staged_or_fresh(&mut batch, holder).forward_to = Some(*target);
        self.staged_or_fresh(&mut batch, target).forwarded_from.push(*holder);
        self.commit(batch);

        if let Some(old) = previous {
            self.prune_if_empty(ledger, &old);
        }
        info!(holder = %holder, target = %target, "payout forwarding set");
        Ok(())
    }

    /// Stop forwarding `holder`'s accrual. Epochs announced while the forward
    /// was in effect are credited to the target before it is cleared.
    pub fn remove_forward(&mut self, ledger: &dyn BalanceLedger, holder: &AccountId) -> Result<(), AccrueError> {
        let Some(target) = self.holders.get(holder).and_then(|s| s.forward_to) else {
            return Ok(());
        };
        let mut batch = self.stage_settlement(holder)?;
        if let Some(status) = batch.status_mut(holder) {
            status.forward_to = None;
        }
        if let Some(target_status) = self.staged(&mut batch, &target) {
            detach(target_status, holder);
        }
        self.commit(batch);

        self.prune_if_empty(ledger, holder);
        self.prune_if_empty(ledger, &target);
        info!(holder = %holder, target = %target, "payout forwarding removed");
        Ok(())
    }

    /// True if following forward links from `start` reaches `needle`.
    fn forwards_into(&self, start: &AccountId, needle: &AccountId) -> bool {
        let mut cursor = *start;
        for _ in 0..=self.holders.len() {
            if cursor == *needle {
                return true;
            }
            match self.holders.get(&cursor).and_then(|s| s.forward_to) {
                Some(next) => cursor = next,
                None => return false,
            }
        }
        false
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Delete `holder`'s status and history once there is nothing left to
    /// track: fully settled, zero ledger balance, zero cache, not frozen, and
    /// no forwarding relationships. Returns true if deleted.
    pub fn prune_if_empty(&mut self, ledger: &dyn BalanceLedger, holder: &AccountId) -> bool {
        let current = self.current_epoch();
        let Some(status) = self.holders.get(holder) else {
            return false;
        };
        let removable = !status.is_frozen
            && status.cached_amount == 0
            && !status.has_relationships()
            && status.is_settled_at(current)
            && ledger.balance_of(holder) == 0;
        if !removable {
            return false;
        }
        self.holders.remove(holder);
        self.history.remove_holder(holder);
        debug!(holder = %holder, "holder status deleted");
        true
    }
}

fn detach(status: &mut HolderStatus, forwarder: &AccountId) {
    if let Some(pos) = status.forwarded_from.iter().position(|a| a == forwarder) {
        status.forwarded_from.swap_remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    // ── Helpers ───────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct TestLedger {
        balances: BTreeMap<AccountId, Balance>,
    }

    impl TestLedger {
        fn set(&mut self, holder: &AccountId, balance: Balance) {
            self.balances.insert(*holder, balance);
        }
    }

    impl BalanceLedger for TestLedger {
        fn balance_of(&self, holder: &AccountId) -> Balance {
            self.balances.get(holder).copied().unwrap_or(0)
        }
        fn total_supply(&self) -> Balance {
            self.balances.values().sum()
        }
    }

    fn id(label: &str) -> AccountId {
        AccountId::from_label(label)
    }

    /// Set a balance on the ledger and notify the engine.
    fn set_balance(engine: &mut DistributionEngine, ledger: &mut TestLedger, holder: &AccountId, balance: Balance) {
        ledger.set(holder, balance);
        engine.on_balance_change(ledger, holder, &AccountId::NULL);
    }

    const NOW: Timestamp = 1_700_000_000;

    // ── Settlement ────────────────────────────────────────────────────────────

    #[test]
    fn one_tenth_of_supply_gets_one_tenth() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, whale) = (id("alice"), id("whale"));
        set_balance(&mut engine, &mut ledger, &alice, 1);
        set_balance(&mut engine, &mut ledger, &whale, 9);

        engine.announce(&ledger, 1_000_000_000, NOW).unwrap();
        assert_eq!(engine.settle(&alice).unwrap(), 100_000_000);
        assert_eq!(engine.settle(&whale).unwrap(), 900_000_000);
    }

    #[test]
    fn never_a_holder_settles_to_zero_without_state() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        set_balance(&mut engine, &mut ledger, &id("whale"), 10);
        engine.announce(&ledger, 100, NOW).unwrap();

        assert_eq!(engine.settle(&id("ghost")).unwrap(), 0);
        assert!(engine.status(&id("ghost")).is_none());
    }

    #[test]
    fn bought_and_sold_before_announcement_accrues_nothing() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, whale) = (id("alice"), id("whale"));
        set_balance(&mut engine, &mut ledger, &whale, 10);
        set_balance(&mut engine, &mut ledger, &alice, 2);
        set_balance(&mut engine, &mut ledger, &alice, 0);
        assert_eq!(engine.history_of(&alice).len(), 1);

        engine.announce(&ledger, 1_000, NOW).unwrap();
        assert_eq!(engine.settle(&alice).unwrap(), 0);
        assert!(engine.prune_if_empty(&ledger, &alice));
        assert!(engine.status(&alice).is_none());
        assert!(engine.history_of(&alice).is_empty());
    }

    #[test]
    fn settle_is_idempotent_and_second_walk_is_empty() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let alice = id("alice");
        set_balance(&mut engine, &mut ledger, &alice, 3);
        set_balance(&mut engine, &mut ledger, &id("bob"), 7);
        for _ in 0..4 {
            engine.announce(&ledger, 1_000, NOW).unwrap();
        }

        let first = engine.settle(&alice).unwrap();
        assert_eq!(first, 4 * 300);
        let batch = engine.stage_settlement(&alice).unwrap();
        assert_eq!(batch.epochs_walked(), 0);
        assert_eq!(engine.settle(&alice).unwrap(), first);
    }

    #[test]
    fn lazy_accrual_follows_balance_over_time() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, bob) = (id("alice"), id("bob"));
        set_balance(&mut engine, &mut ledger, &alice, 5);
        set_balance(&mut engine, &mut ledger, &bob, 5);
        engine.announce(&ledger, 1_000, NOW).unwrap(); // alice 5/10
        set_balance(&mut engine, &mut ledger, &alice, 15);
        engine.announce(&ledger, 1_000, NOW).unwrap(); // alice 15/20
        set_balance(&mut engine, &mut ledger, &alice, 0);
        engine.announce(&ledger, 1_000, NOW).unwrap(); // alice 0/5

        assert_eq!(engine.settle(&alice).unwrap(), 500 + 750);
        assert_eq!(engine.settle(&bob).unwrap(), 500 + 250 + 1_000);
    }

    #[test]
    fn settlement_compacts_unreachable_history() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let alice = id("alice");
        set_balance(&mut engine, &mut ledger, &id("bob"), 1);
        for b in 1..=5 {
            set_balance(&mut engine, &mut ledger, &alice, b);
            engine.announce(&ledger, 100, NOW).unwrap();
        }
        assert_eq!(engine.history_of(&alice).len(), 5);
        engine.settle(&alice).unwrap();
        let left = engine.history_of(&alice);
        assert_eq!(left, vec![BalanceHistoryEntry { epoch: 4, balance: 5 }]);

        // Later settlement still finds the anchor.
        engine.announce(&ledger, 600, NOW).unwrap();
        let before = engine.status(&alice).unwrap().cached_amount;
        assert_eq!(engine.settle(&alice).unwrap(), before + 500);
    }

    #[test]
    fn staged_settlement_is_not_observed_until_commit() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let alice = id("alice");
        set_balance(&mut engine, &mut ledger, &alice, 1);
        engine.announce(&ledger, 100, NOW).unwrap();

        let snapshot = engine.clone();
        let batch = engine.stage_settlement(&alice).unwrap();
        assert_eq!(batch.cached_amount(&alice), 100);
        drop(batch);
        assert_eq!(engine, snapshot);
    }

    #[test]
    fn new_holder_does_not_walk_epochs_before_it_existed() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        set_balance(&mut engine, &mut ledger, &id("whale"), 10);
        for _ in 0..50 {
            engine.announce(&ledger, 100, NOW).unwrap();
        }
        let late = id("late");
        set_balance(&mut engine, &mut ledger, &late, 10);
        engine.announce(&ledger, 100, NOW).unwrap();

        let batch = engine.stage_settlement(&late).unwrap();
        assert_eq!(batch.epochs_walked(), 1);
        assert_eq!(batch.cached_amount(&late), 50);
    }

    // ── Freeze ────────────────────────────────────────────────────────────────

    #[test]
    fn frozen_holder_stops_accruing_and_resumes_after_unfreeze() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, bob) = (id("alice"), id("bob"));
        set_balance(&mut engine, &mut ledger, &alice, 1);
        set_balance(&mut engine, &mut ledger, &bob, 1);

        engine.announce(&ledger, 100, NOW).unwrap(); // epoch 0 counts
        assert!(engine.freeze(&alice, NOW).unwrap());
        assert!(!engine.freeze(&alice, NOW + 1).unwrap());
        engine.announce(&ledger, 100, NOW).unwrap(); // epoch 1 frozen
        assert_eq!(engine.settle(&alice).unwrap(), 50);
        engine.announce(&ledger, 100, NOW).unwrap(); // epoch 2 frozen
        assert_eq!(engine.settle(&alice).unwrap(), 50);

        assert!(engine.unfreeze(&ledger, &alice).unwrap());
        assert_eq!(engine.settle(&alice).unwrap(), 50);
        engine.announce(&ledger, 100, NOW).unwrap(); // epoch 3 counts
        assert_eq!(engine.settle(&alice).unwrap(), 100);
        assert!(!engine.unfreeze(&ledger, &alice).unwrap());
    }

    #[test]
    fn unfreezing_an_empty_account_deletes_its_status() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, ghost) = (id("alice"), id("ghost"));
        set_balance(&mut engine, &mut ledger, &alice, 1);
        engine.announce(&ledger, 100, NOW).unwrap();

        engine.freeze(&ghost, NOW).unwrap();
        assert!(engine.status(&ghost).is_some());
        engine.unfreeze(&ledger, &ghost).unwrap();
        assert!(engine.status(&ghost).is_none());

        set_balance(&mut engine, &mut ledger, &alice, 0);
        engine.freeze(&alice, NOW).unwrap();
        engine.unfreeze(&ledger, &alice).unwrap();
        assert_eq!(engine.status(&alice).map(|s| s.cached_amount), Some(100));
    }

    #[test]
    fn frozen_before_any_distribution_accrues_nothing() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let alice = id("alice");
        set_balance(&mut engine, &mut ledger, &alice, 1);
        engine.freeze(&alice, NOW).unwrap();
        assert_eq!(engine.status(&alice).unwrap().frozen_epoch, 0);
        engine.announce(&ledger, 100, NOW).unwrap();
        assert_eq!(engine.settle(&alice).unwrap(), 0);
    }

    #[test]
    fn freezing_null_account_rejected() {
        let mut engine = DistributionEngine::new();
        assert_eq!(engine.freeze(&AccountId::NULL, NOW), Err(AccrueError::InvalidTarget));
    }

    // ── Forwarding ────────────────────────────────────────────────────────────

    #[test]
    fn forwarding_credits_target_for_later_distributions() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, bob) = (id("alice"), id("bob"));
        set_balance(&mut engine, &mut ledger, &alice, 1);
        set_balance(&mut engine, &mut ledger, &id("whale"), 9);

        engine.announce(&ledger, 1_000, NOW).unwrap(); // alice's own: 100
        engine.set_forward(&ledger, &alice, &bob).unwrap();
        assert_eq!(engine.status(&alice).unwrap().cached_amount, 100);

        engine.announce(&ledger, 1_000, NOW).unwrap(); // forwarded: 100
        assert_eq!(engine.settle(&bob).unwrap(), 100);
        assert_eq!(engine.settle(&alice).unwrap(), 100);

        engine.announce(&ledger, 1_000, NOW).unwrap(); // forwarded: 100
        engine.remove_forward(&ledger, &alice).unwrap();
        assert_eq!(engine.settle(&bob).unwrap(), 200);
        assert_eq!(engine.settle(&alice).unwrap(), 100);

        engine.announce(&ledger, 1_000, NOW).unwrap(); // alice's own again
        assert_eq!(engine.settle(&alice).unwrap(), 200);
        assert_eq!(engine.settle(&bob).unwrap(), 200);
        assert!(engine.status(&alice).unwrap().forward_to.is_none());
        assert!(engine.status(&bob).unwrap().forwarded_from.is_empty());
    }

    #[test]
    fn switching_target_settles_under_previous_target() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, bob, carol) = (id("alice"), id("bob"), id("carol"));
        set_balance(&mut engine, &mut ledger, &alice, 1);

        engine.set_forward(&ledger, &alice, &bob).unwrap();
        engine.announce(&ledger, 10, NOW).unwrap();
        engine.set_forward(&ledger, &alice, &carol).unwrap();
        engine.announce(&ledger, 10, NOW).unwrap();

        // bob's only relationship ended and his credit is nonzero: kept.
        assert_eq!(engine.settle(&bob).unwrap(), 10);
        assert_eq!(engine.settle(&carol).unwrap(), 10);
        assert_eq!(engine.settle(&alice).unwrap(), 0);
        assert_eq!(engine.status(&carol).unwrap().forwarded_from, vec![alice]);
    }

    #[test]
    fn invalid_forward_targets_rejected() {
        let mut engine = DistributionEngine::new();
        let ledger = TestLedger::default();
        let (alice, bob, carol) = (id("alice"), id("bob"), id("carol"));
        assert_eq!(engine.set_forward(&ledger, &alice, &alice), Err(AccrueError::InvalidTarget));
        assert_eq!(engine.set_forward(&ledger, &alice, &AccountId::NULL), Err(AccrueError::InvalidTarget));

        engine.set_forward(&ledger, &alice, &bob).unwrap();
        engine.set_forward(&ledger, &bob, &carol).unwrap();
        assert_eq!(engine.set_forward(&ledger, &carol, &alice), Err(AccrueError::InvalidTarget));
    }

    #[test]
    fn removing_forward_deletes_empty_records() {
        let mut engine = DistributionEngine::new();
        let ledger = TestLedger::default();
        let (alice, bob) = (id("alice"), id("bob"));
        engine.set_forward(&ledger, &alice, &bob).unwrap();
        engine.remove_forward(&ledger, &alice).unwrap();
        assert!(engine.status(&alice).is_none());
        assert!(engine.status(&bob).is_none());
    }

    #[test]
    fn chained_forwarders_fold_into_their_direct_target() {
        let mut engine = DistributionEngine::new();
        let mut ledger = TestLedger::default();
        let (alice, bob, carol) = (id("alice"), id("bob"), id("carol"));
        set_balance(&mut engine, &mut ledger, &alice, 1);
        set_balance(&mut engine, &mut ledger, &bob, 1);
        engine.set_forward(&ledger, &alice, &bob).unwrap();
        engine.set_forward(&ledger, &bob, &carol).unwrap();
        engine.announce(&ledger, 10, NOW).unwrap();

        // carol settles bob, which first settles alice into bob's cache.
        assert_eq!(engine.settle(&carol).unwrap(), 5);
        assert_eq!(engine.status(&bob).unwrap().cached_amount, 5);
    }
}
