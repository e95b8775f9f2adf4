use std::collections::BTreeMap;

use accrue_core::error::AccrueError;
use accrue_core::interfaces::BalanceLedger;
use accrue_core::types::{AccountId, Balance};
use serde::{Deserialize, Serialize};

/// In-memory fungible balance ledger. Every mutation validates before it
/// writes, so a failed call changes nothing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryLedger {
    balances: BTreeMap<AccountId, Balance>,
    total_supply: Balance,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AccrueError::ArithmeticOverflow)?;
        let balance = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    pub fn burn(&mut self, from: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(AccrueError::InsufficientBalance { need: amount, have });
        }
        self.set(from, have - amount);
        self.total_supply -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(AccrueError::InsufficientBalance { need: amount, have });
        }
        self.set(from, have - amount);
        let credited = self.balance_of(to) + amount;
        self.set(to, credited);
        Ok(())
    }

    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &Balance)> {
        self.balances.iter()
    }

    fn set(&mut self, holder: &AccountId, balance: Balance) {
        if balance == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, balance);
        }
    }
}

impl BalanceLedger for MemoryLedger {
    fn balance_of(&self, holder: &AccountId) -> Balance {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Balance {
        self.total_supply
    }
}
