/// ─── Accrue Protocol Constants ──────────────────────────────────────────────
///
/// Payout amounts are fixed-point integers with 6 implied decimals.
/// Fees are expressed in basis points of the gross pending amount.

// ── Payout precision ─────────────────────────────────────────────────────────

/// Implied decimals of distribution amounts and cached entitlements.
pub const PAYOUT_DECIMALS: u8 = 6;

/// 1 whole payout unit expressed in base units.
pub const PAYOUT_UNIT: u128 = 1_000_000;

/// Decimals of the native payout rail (always the internal convention).
pub const NATIVE_DECIMALS: u8 = PAYOUT_DECIMALS;

// ── Fees ─────────────────────────────────────────────────────────────────────

/// Basis-point denominator: 10_000 bps = 100%.
pub const FEE_DENOMINATOR: u128 = 10_000;

/// Fee charged on claims unless configured otherwise.
pub const DEFAULT_FEE_BPS: u32 = 0;

// ── Lock-up ──────────────────────────────────────────────────────────────────

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Minimum holding period before acquired units may move. Default: 365 days.
pub const DEFAULT_MIN_HOLD_SECS: i64 = 365 * SECONDS_PER_DAY;

// ── Freeze ───────────────────────────────────────────────────────────────────

/// Delay after a freeze before an administrator may move the frozen
/// holder's balance without consent. Default: 30 days.
pub const FREEZE_GRACE_PERIOD_SECS: i64 = 30 * SECONDS_PER_DAY;
