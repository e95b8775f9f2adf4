use accrue_core::constants::FEE_DENOMINATOR;
use accrue_core::error::AccrueError;
use accrue_core::interfaces::{Authorizer, BalanceLedger, Capability, PaymentAsset};
use accrue_core::types::{AccountId, Balance, Epoch, Timestamp};
use accrue_lockup::LockUpScheduler;
use accrue_state::{DistributionEngine, ReentrancyLock};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TokenConfig;
use crate::ledger::MemoryLedger;
use crate::payment::{scale_from_decimals, scale_to_decimals, PayoutRail};
use crate::roles::RoleGate;

// ── Settings and results ─────────────────────────────────────────────────────

/// Mutable token parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSettings {
    pub name: String,
    pub fee_bps: u32,
    pub vault: AccountId,
    pub freeze_grace_secs: i64,
    /// Fees retained in the vault by claims so far (6 implied decimals).
    pub fees_collected: Balance,
}

/// Amount to withdraw from the vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Withdrawal {
    All,
    Amount(Balance),
}

/// Outcome of a successful claim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub holder: AccountId,
    pub rail: PayoutRail,
    /// Settled entitlement before the fee (6 implied decimals).
    pub gross: Balance,
    pub fee: Balance,
    /// Entitlement debited for the payment. Less than `gross - fee` only when
    /// the rail's precision left a remainder pending.
    pub net: Balance,
    /// Amount transferred, in the rail's own decimals.
    pub paid: Balance,
    pub decimals: u8,
}

/// Operator view of one holder. Built from committed state without settling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderSummary {
    pub holder: AccountId,
    pub balance: Balance,
    pub unlocked: Balance,
    /// Tracked units still inside their minimum hold.
    pub locked: Balance,
    pub frozen: bool,
    pub cached_amount: Balance,
    pub last_settled_epoch: Option<Epoch>,
    pub forward_to: Option<AccountId>,
    pub forwarded_from: usize,
}

fn validate_fee(bps: u32) -> Result<(), AccrueError> {
    if u128::from(bps) > FEE_DENOMINATOR {
        return Err(AccrueError::InvalidFee { bps });
    }
    Ok(())
}

// ── PayoutToken ──────────────────────────────────────────────────────────────

/// A fungible token whose holders accrue a pro-rata share of every announced
/// distribution, claimable from the vault on one of two payment rails.
///
/// Every entry point enters the token's `ReentrancyLock` first and either
/// completes or leaves state untouched.
#[derive(Debug)]
pub struct PayoutToken<P: PaymentAsset> {
    pub(crate) settings: TokenSettings,
    pub(crate) ledger: MemoryLedger,
    pub(crate) engine: DistributionEngine,
    pub(crate) lockups: LockUpScheduler,
    pub(crate) gate: RoleGate,
    pub(crate) payment: P,
    pub(crate) native: P,
    lock: ReentrancyLock,
}

impl<P: PaymentAsset> PayoutToken<P> {
    pub fn from_config(config: &TokenConfig, payment: P, native: P) -> Result<Self, AccrueError> {
        config.validate()?;
        let settings = TokenSettings {
            name: config.name.clone(),
            fee_bps: config.fee_bps,
            vault: config.vault_id(),
            freeze_grace_secs: config.freeze_grace_secs,
            fees_collected: 0,
        };
        Ok(Self::from_parts(
            settings,
            MemoryLedger::new(),
            DistributionEngine::new(),
            LockUpScheduler::new(config.min_hold_secs),
            RoleGate::with_admins(config.admin_ids()),
            payment,
            native,
        ))
    }

    pub fn from_parts(
        settings: TokenSettings,
        ledger: MemoryLedger,
        engine: DistributionEngine,
        lockups: LockUpScheduler,
        gate: RoleGate,
        payment: P,
        native: P,
    ) -> Self {
        Self { settings, ledger, engine, lockups, gate, payment, native, lock: ReentrancyLock::new() }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &DistributionEngine {
        &self.engine
    }

    pub fn lockups(&self) -> &LockUpScheduler {
        &self.lockups
    }

    pub fn gate(&self) -> &RoleGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut RoleGate {
        &mut self.gate
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    pub fn payment_mut(&mut self) -> &mut P {
        &mut self.payment
    }

    pub fn native(&self) -> &P {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut P {
        &mut self.native
    }

    /// Handle to the call-in-progress flag, for collaborators that call back.
    pub fn reentrancy_lock(&self) -> ReentrancyLock {
        self.lock.clone()
    }

    pub fn is_frozen(&self, holder: &AccountId) -> bool {
        self.engine.is_frozen(holder)
    }

    pub fn available_unlocked(&self, holder: &AccountId, now: Timestamp) -> Balance {
        self.lockups.available_unlocked(holder, now)
    }

    pub fn holder_summary(&self, holder: &AccountId, now: Timestamp) -> HolderSummary {
        let status = self.engine.status(holder);
        let unlocked = self.lockups.available_unlocked(holder, now);
        HolderSummary {
            holder: *holder,
            balance: self.ledger.balance_of(holder),
            unlocked,
            locked: self.lockups.tracked_total(holder).saturating_sub(unlocked),
            frozen: status.is_some_and(|s| s.is_frozen),
            cached_amount: status.map(|s| s.cached_amount).unwrap_or(0),
            last_settled_epoch: status.map(|s| s.last_settled_epoch),
            forward_to: status.and_then(|s| s.forward_to),
            forwarded_from: status.map(|s| s.forwarded_from.len()).unwrap_or(0),
        }
    }

    // ── Distributions and claims ─────────────────────────────────────────────

    /// Announce a distribution of `amount` (6 implied decimals) against the
    /// current total supply. Returns the sealed epoch.
    pub fn announce_distribution(
        &mut self,
        caller: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> Result<Epoch, AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::Announce)?;
        self.engine.announce(&self.ledger, amount, now)
    }

    /// Settle `holder` and return its pending entitlement. Commits the
    /// settlement.
    pub fn query_pending(&mut self, holder: &AccountId) -> Result<Balance, AccrueError> {
        let _guard = self.lock.enter()?;
        self.engine.settle(holder)
    }

    /// Settle `holder` and pay its entitlement, net of fee, from the vault.
    ///
    /// Settlement is staged and committed only after the payment transfer
    /// succeeds. When the payment asset has fewer decimals than the payout
    /// precision, the part of the net amount too small to pay stays pending.
    pub fn claim(
        &mut self,
        holder: &AccountId,
        pay_in_payment_asset: bool,
        use_custom_fee: bool,
        fee_override: u32,
    ) -> Result<ClaimReceipt, AccrueError> {
        let _guard = self.lock.enter()?;
        if self.engine.is_frozen(holder) {
            return Err(AccrueError::HolderFrozen(holder.to_string()));
        }
        let fee_bps = if use_custom_fee { fee_override } else { self.settings.fee_bps };
        validate_fee(fee_bps)?;

        let mut batch = self.engine.stage_settlement(holder)?;
        let gross = batch.cached_amount(holder);
        if gross == 0 {
            return Err(AccrueError::NoPendingEntitlement);
        }
        let fee = gross
            .checked_mul(u128::from(fee_bps))
            .ok_or(AccrueError::ArithmeticOverflow)?
            / FEE_DENOMINATOR;
        let owed = gross - fee;

        let (rail, asset) = if pay_in_payment_asset {
            (PayoutRail::PaymentAsset, &mut self.payment)
        } else {
            (PayoutRail::Native, &mut self.native)
        };
        let decimals = asset.decimals();
        let paid = scale_to_decimals(owed, decimals)?;
        if paid == 0 && owed > 0 {
            return Err(AccrueError::NoPendingEntitlement);
        }
        let net = scale_from_decimals(paid, decimals)?;
        let vault = self.settings.vault;
        let have = asset.balance_of(&vault);
        if have < paid {
            return Err(AccrueError::InsufficientPaymentAssetBalance { need: paid, have });
        }
        if paid > 0 {
            asset.transfer(&vault, holder, paid)?;
        }

        if let Some(status) = batch.status_mut(holder) {
            status.cached_amount = owed - net;
        }
        self.engine.commit(batch);
        self.settings.fees_collected = self.settings.fees_collected.saturating_add(fee);
        self.engine.prune_if_empty(&self.ledger, holder);

        info!(holder = %holder, ?rail, gross, fee, paid, "entitlement claimed");
        Ok(ClaimReceipt { holder: *holder, rail, gross, fee, net, paid, decimals })
    }

    // ── Administration ───────────────────────────────────────────────────────

    pub fn freeze(&mut self, caller: &AccountId, holder: &AccountId, now: Timestamp) -> Result<bool, AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::Freeze)?;
        self.engine.freeze(holder, now)
    }

    pub fn unfreeze(&mut self, caller: &AccountId, holder: &AccountId) -> Result<bool, AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::Freeze)?;
        self.engine.unfreeze(&self.ledger, holder)
    }

    pub fn set_forward(
        &mut self,
        caller: &AccountId,
        holder: &AccountId,
        target: &AccountId,
    ) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::SetForward)?;
        self.engine.set_forward(&self.ledger, holder, target)
    }

    pub fn remove_forward(&mut self, caller: &AccountId, holder: &AccountId) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::SetForward)?;
        self.engine.remove_forward(&self.ledger, holder)
    }

    pub fn set_fee(&mut self, caller: &AccountId, fee_bps: u32) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::SetFee)?;
        validate_fee(fee_bps)?;
        let previous = std::mem::replace(&mut self.settings.fee_bps, fee_bps);
        info!(previous, fee_bps, "claim fee updated");
        Ok(())
    }

    /// Move payment asset from the vault to `caller`. Returns the amount moved.
    pub fn withdraw(&mut self, caller: &AccountId, request: Withdrawal) -> Result<Balance, AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::Withdraw)?;
        let vault = self.settings.vault;
        let have = self.payment.balance_of(&vault);
        let amount = match request {
            Withdrawal::All => have,
            Withdrawal::Amount(0) => return Err(AccrueError::ZeroAmount),
            Withdrawal::Amount(amount) => amount,
        };
        if amount > have {
            return Err(AccrueError::InsufficientPaymentAssetBalance { need: amount, have });
        }
        if amount > 0 {
            self.payment.transfer(&vault, caller, amount)?;
        }
        info!(caller = %caller, amount, "vault withdrawal");
        Ok(amount)
    }

    // ── Ledger entry points ──────────────────────────────────────────────────

    /// Issue new units to `to`, locked from `now`.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::Mint)?;
        if to.is_null() {
            return Err(AccrueError::InvalidTarget);
        }
        if amount == 0 {
            return Err(AccrueError::ZeroAmount);
        }
        self.ensure_not_frozen(to)?;
        self.ledger.mint(to, amount)?;
        self.lockups.lock(to, amount, now)?;
        self.engine.on_balance_change(&self.ledger, &AccountId::NULL, to);
        info!(to = %to, amount, "units minted");
        Ok(())
    }

    /// Destroy unlocked units held by `holder`.
    pub fn burn(&mut self, holder: &AccountId, amount: Balance, now: Timestamp) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        if amount == 0 {
            return Err(AccrueError::ZeroAmount);
        }
        self.ensure_not_frozen(holder)?;
        self.ensure_balance(holder, amount)?;
        self.lockups.unlock(holder, amount, now, false)?;
        self.ledger.burn(holder, amount)?;
        self.engine.on_balance_change(&self.ledger, holder, &AccountId::NULL);
        self.engine.prune_if_empty(&self.ledger, holder);
        info!(holder = %holder, amount, "units burned");
        Ok(())
    }

    /// Move unlocked units; the recipient's lot is locked from `now`.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.check_transfer(from, to, amount)?;
        self.ensure_not_frozen(from)?;
        self.move_units(from, to, amount, now, false)
    }

    /// Custodial recovery: move a frozen holder's units once the freeze grace
    /// period has elapsed. Ignores the minimum hold.
    pub fn force_transfer(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> Result<(), AccrueError> {
        let _guard = self.lock.enter()?;
        self.gate.authorize(caller, Capability::ForceTransfer)?;
        self.check_transfer(from, to, amount)?;
        let frozen_at = match self.engine.status(from) {
            Some(status) if status.is_frozen => status.frozen_timestamp,
            _ => return Err(AccrueError::HolderNotFrozen(from.to_string())),
        };
        let until = frozen_at.saturating_add(self.settings.freeze_grace_secs);
        if now < until {
            return Err(AccrueError::FreezeGracePeriodActive { until });
        }
        self.move_units(from, to, amount, now, true)?;
        info!(caller = %caller, from = %from, to = %to, amount, "forced transfer");
        Ok(())
    }

    fn check_transfer(&self, from: &AccountId, to: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        if amount == 0 {
            return Err(AccrueError::ZeroAmount);
        }
        if from.is_null() || to.is_null() {
            return Err(AccrueError::InvalidTarget);
        }
        if from == to {
            return Err(AccrueError::SelfTransfer);
        }
        self.ensure_not_frozen(to)?;
        self.ensure_balance(from, amount)
    }

    fn move_units(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
        now: Timestamp,
        ignore_min_hold: bool,
    ) -> Result<(), AccrueError> {
        self.lockups.unlock(from, amount, now, ignore_min_hold)?;
        self.ledger.transfer(from, to, amount)?;
        self.lockups.lock(to, amount, now)?;
        self.engine.on_balance_change(&self.ledger, from, to);
        self.engine.prune_if_empty(&self.ledger, from);
        Ok(())
    }

    fn ensure_not_frozen(&self, holder: &AccountId) -> Result<(), AccrueError> {
        if self.engine.is_frozen(holder) {
            return Err(AccrueError::HolderFrozen(holder.to_string()));
        }
        Ok(())
    }

    fn ensure_balance(&self, holder: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let have = self.ledger.balance_of(holder);
        if have < amount {
            return Err(AccrueError::InsufficientBalance { need: amount, have });
        }
        Ok(())
    }
}
