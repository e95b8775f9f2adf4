use std::cmp::Ordering;
use std::collections::BTreeMap;

use accrue_core::constants::{NATIVE_DECIMALS, PAYOUT_DECIMALS};
use accrue_core::error::AccrueError;
use accrue_core::interfaces::PaymentAsset;
use accrue_core::types::{AccountId, Balance};
use serde::{Deserialize, Serialize};

/// Rail a claim is paid on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutRail {
    PaymentAsset,
    Native,
}

/// Convert a 6-decimal payout amount into an asset with `decimals`.
///
/// Scaling down floors; the remainder stays with the payer.
pub fn scale_to_decimals(amount: Balance, decimals: u8) -> Result<Balance, AccrueError> {
    match decimals.cmp(&PAYOUT_DECIMALS) {
        Ordering::Equal => Ok(amount),
        Ordering::Greater => 10u128
            .checked_pow(u32::from(decimals - PAYOUT_DECIMALS))
            .and_then(|factor| amount.checked_mul(factor))
            .ok_or(AccrueError::ArithmeticOverflow),
        Ordering::Less => Ok(amount / 10u128.pow(u32::from(PAYOUT_DECIMALS - decimals))),
    }
}

/// Payout-precision value of `amount` units of an asset with `decimals`.
/// Exact for amounts produced by `scale_to_decimals`.
pub fn scale_from_decimals(amount: Balance, decimals: u8) -> Result<Balance, AccrueError> {
    match decimals.cmp(&PAYOUT_DECIMALS) {
        Ordering::Equal => Ok(amount),
        Ordering::Greater => Ok(amount / 10u128.pow(u32::from(decimals - PAYOUT_DECIMALS))),
        Ordering::Less => amount
            .checked_mul(10u128.pow(u32::from(PAYOUT_DECIMALS - decimals)))
            .ok_or(AccrueError::ArithmeticOverflow),
    }
}

/// In-memory payment asset with fixed decimals.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryPaymentAsset {
    decimals: u8,
    balances: BTreeMap<AccountId, Balance>,
}

impl MemoryPaymentAsset {
    pub fn new(decimals: u8) -> Self {
        Self { decimals, balances: BTreeMap::new() }
    }

    /// The native payout rail, which always uses the internal 6 decimals.
    pub fn native() -> Self {
        Self::new(NATIVE_DECIMALS)
    }

    /// Credit `amount` to `to` from outside the system (vault funding).
    pub fn fund(&mut self, to: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AccrueError::ArithmeticOverflow)?;
        self.balances.insert(*to, balance);
        Ok(())
    }
}

impl PaymentAsset for MemoryPaymentAsset {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &AccountId) -> Balance {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Balance) -> Result<(), AccrueError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(AccrueError::PaymentFailed(format!(
                "payer holds {have}, transfer needs {amount}"
            )));
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AccrueError::ArithmeticOverflow)?;
        self.balances.insert(*from, have - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}
