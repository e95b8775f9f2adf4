//! accrue-token
//!
//! The payout token: a fungible balance ledger composed with the
//! lazy-settlement engine, the lock-up scheduler, a capability gate and the
//! payment rails claims are paid on. Every top-level operation is guarded
//! against re-entry and is all-or-nothing.

pub mod config;
pub mod ledger;
pub mod payment;
pub mod roles;
pub mod store;
pub mod token;

pub use config::{resolve_account, TokenConfig};
pub use ledger::MemoryLedger;
pub use payment::{scale_from_decimals, scale_to_decimals, MemoryPaymentAsset, PayoutRail};
pub use roles::RoleGate;
pub use store::{load_token, save_token};
pub use token::{ClaimReceipt, HolderSummary, PayoutToken, TokenSettings, Withdrawal};
