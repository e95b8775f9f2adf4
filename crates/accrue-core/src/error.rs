use thiserror::Error;

use crate::interfaces::Capability;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrueError {
    // ── Entitlement errors ───────────────────────────────────────────────────
    #[error("no pending entitlement to claim")]
    NoPendingEntitlement,

    #[error("insufficient payment asset balance: need {need}, have {have}")]
    InsufficientPaymentAssetBalance { need: u128, have: u128 },

    #[error("payment transfer failed: {0}")]
    PaymentFailed(String),

    #[error("fee of {bps} bps exceeds 10000 bps")]
    InvalidFee { bps: u32 },

    // ── Holder lifecycle errors ──────────────────────────────────────────────
    #[error("holder is frozen: {0}")]
    HolderFrozen(String),

    #[error("holder is not frozen: {0}")]
    HolderNotFrozen(String),

    #[error("freeze grace period still active (ends at {until})")]
    FreezeGracePeriodActive { until: i64 },

    #[error("invalid target account")]
    InvalidTarget,

    // ── Ledger errors ────────────────────────────────────────────────────────
    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u128, have: u128 },

    #[error("insufficient unlocked balance: need {need}, have {have}")]
    InsufficientUnlockable { need: u128, have: u128 },

    #[error("self-transfer not allowed")]
    SelfTransfer,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("total supply is zero; nothing to distribute against")]
    ZeroSupply,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    // ── Auth / concurrency ───────────────────────────────────────────────────
    #[error("caller lacks capability {capability:?}")]
    Unauthorized { capability: Capability },

    #[error("another call is already in progress")]
    CallInProgress,

    // ── Serialization / storage / config ─────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}
