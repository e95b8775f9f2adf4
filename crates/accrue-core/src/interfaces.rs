//! Collaborator seams consumed by the accounting core.

use serde::{Deserialize, Serialize};

use crate::error::AccrueError;
use crate::types::{AccountId, Balance};

/// Read-only view of the fungible balance ledger.
pub trait BalanceLedger {
    fn balance_of(&self, holder: &AccountId) -> Balance;
    fn total_supply(&self) -> Balance;
}

/// A payout asset the vault pays claims with.
pub trait PaymentAsset {
    /// Decimal precision of the asset's base unit.
    fn decimals(&self) -> u8;
    fn balance_of(&self, holder: &AccountId) -> Balance;
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), AccrueError>;
}

/// Capabilities checked before state-mutating entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Announce,
    Freeze,
    SetFee,
    SetForward,
    Withdraw,
    Mint,
    ForceTransfer,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Announce,
        Capability::Freeze,
        Capability::SetFee,
        Capability::SetForward,
        Capability::Withdraw,
        Capability::Mint,
        Capability::ForceTransfer,
    ];
}

/// Capability gate.
pub trait Authorizer {
    fn has_capability(&self, caller: &AccountId, capability: Capability) -> bool;

    fn authorize(&self, caller: &AccountId, capability: Capability) -> Result<(), AccrueError> {
        if self.has_capability(caller, capability) {
            Ok(())
        } else {
            Err(AccrueError::Unauthorized { capability })
        }
    }
}
