use accrue_core::constants::{
    DEFAULT_FEE_BPS, DEFAULT_MIN_HOLD_SECS, FEE_DENOMINATOR, FREEZE_GRACE_PERIOD_SECS,
    PAYOUT_DECIMALS,
};
use accrue_core::error::AccrueError;
use accrue_core::types::AccountId;
use serde::{Deserialize, Serialize};

// ── Serde default helpers ──────────────────────────────────────────────────────

fn default_fee_bps() -> u32 { DEFAULT_FEE_BPS }
fn default_payment_decimals() -> u8 { PAYOUT_DECIMALS }
fn default_min_hold_secs() -> i64 { DEFAULT_MIN_HOLD_SECS }
fn default_freeze_grace_secs() -> i64 { FREEZE_GRACE_PERIOD_SECS }

/// Resolve an account argument: a base-58 32-byte id, or otherwise a label
/// hashed with `AccountId::from_label`.
pub fn resolve_account(s: &str) -> AccountId {
    AccountId::from_b58(s).unwrap_or_else(|_| AccountId::from_label(s))
}

/// Token deployment parameters, loaded from JSON on first start.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenConfig {
    /// Display name of the token.
    pub name: String,
    /// Claim fee in basis points of the gross pending amount.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
    /// Decimals of the payment asset claims are paid in.
    #[serde(default = "default_payment_decimals")]
    pub payment_decimals: u8,
    /// Minimum holding period of acquired units (seconds).
    #[serde(default = "default_min_hold_secs")]
    pub min_hold_secs: i64,
    /// Delay after a freeze before custodial recovery may move the balance.
    #[serde(default = "default_freeze_grace_secs")]
    pub freeze_grace_secs: i64,
    /// Account that holds payment assets and pays claims.
    pub vault: String,
    /// Accounts holding every capability.
    #[serde(default)]
    pub admins: Vec<String>,
}

impl TokenConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AccrueError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AccrueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AccrueError> {
        if self.fee_bps as u128 > FEE_DENOMINATOR {
            return Err(AccrueError::InvalidFee { bps: self.fee_bps });
        }
        if self.payment_decimals > 36 {
            return Err(AccrueError::Config(format!(
                "payment_decimals {} is out of range",
                self.payment_decimals
            )));
        }
        if self.min_hold_secs < 0 || self.freeze_grace_secs < 0 {
            return Err(AccrueError::Config("durations must not be negative".into()));
        }
        if self.vault_id().is_null() {
            return Err(AccrueError::InvalidTarget);
        }
        Ok(())
    }

    pub fn vault_id(&self) -> AccountId {
        resolve_account(&self.vault)
    }

    pub fn admin_ids(&self) -> Vec<AccountId> {
        self.admins.iter().map(|a| resolve_account(a)).collect()
    }
}
