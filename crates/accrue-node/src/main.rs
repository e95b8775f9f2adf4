//! accrue-node: operator CLI for an accrue payout token.
//!
//! Each invocation:
//!   1. Opens the state database under `--data-dir`
//!   2. Loads the token (or initialises it from a JSON config with `init`)
//!   3. Applies exactly one command at `--now` (wall clock by default)
//!   4. Persists the token and prints the result as JSON on stdout
//!
//! Accounts are given either as base-58 ids or as labels, which are hashed
//! into ids (`alice` always names the same account).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use accrue_core::interfaces::{BalanceLedger, PaymentAsset};
use accrue_core::types::{AccountId, Balance, Timestamp};
use accrue_lockup::LockUpQuery;
use accrue_state::StateDb;
use accrue_token::{
    load_token, resolve_account, save_token, MemoryPaymentAsset, PayoutToken, TokenConfig, Withdrawal,
};

type Token = PayoutToken<MemoryPaymentAsset>;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "accrue-node",
    version,
    about = "accrue: pro-rata payout token with lazy settlement"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.accrue/data")]
    data_dir: PathBuf,

    /// Unix timestamp (seconds) to apply the command at. Defaults to now.
    #[arg(long, global = true)]
    now: Option<Timestamp>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the token from a JSON config. Only valid on a fresh data dir.
    Init {
        /// Path to the token config JSON.
        #[arg(long)]
        config: PathBuf,
    },

    /// Issue new units (capability: Mint).
    Mint {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Balance,
    },

    /// Move unlocked units between holders.
    Transfer {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Balance,
    },

    /// Destroy unlocked units.
    Burn {
        #[arg(long)]
        holder: String,
        #[arg(long)]
        amount: Balance,
    },

    /// Announce a distribution in 6-decimal base units (capability: Announce).
    Announce {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        amount: Balance,
    },

    /// Claim a holder's pending entitlement from the vault.
    Claim {
        #[arg(long)]
        holder: String,
        /// Pay on the native rail instead of the payment asset.
        #[arg(long, default_value_t = false)]
        native: bool,
        /// Fee in basis points replacing the configured fee for this claim.
        #[arg(long)]
        fee_override: Option<u32>,
    },

    /// Settle and print a holder's pending entitlement.
    Pending {
        #[arg(long)]
        holder: String,
    },

    /// Freeze a holder (capability: Freeze).
    Freeze {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        holder: String,
    },

    /// Lift a freeze (capability: Freeze).
    Unfreeze {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        holder: String,
    },

    /// Forward a holder's future accrual to a target (capability: SetForward).
    Forward {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        target: String,
    },

    /// Stop forwarding a holder's accrual (capability: SetForward).
    Unforward {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        holder: String,
    },

    /// Set the claim fee in basis points (capability: SetFee).
    SetFee {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        bps: u32,
    },

    /// Withdraw payment asset from the vault (capability: Withdraw).
    Withdraw {
        #[arg(long)]
        caller: String,
        /// Amount to withdraw. Omit to withdraw everything.
        #[arg(long)]
        amount: Option<Balance>,
    },

    /// Credit payment asset from outside the system. Defaults to the vault.
    Fund {
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        amount: Balance,
        /// Fund the native rail instead of the payment asset.
        #[arg(long, default_value_t = false)]
        native: bool,
    },

    /// Print a holder's balance, lock-up and settlement status.
    Status {
        #[arg(long)]
        holder: String,
    },

    /// Move a frozen holder's units after the grace period (capability: ForceTransfer).
    ForceTransfer {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Balance,
    },
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,accrue=debug")),
        )
        .init();

    let args = Args::parse();
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = StateDb::open(&data_dir).context("opening state database")?;

    if let Command::Init { config } = &args.command {
        let output = cmd_init(&db, config)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut token = load_token(&db)
        .context("loading token state")?
        .context("no token in this data dir; run `accrue-node init --config <path>` first")?;

    let output = match run(&mut token, args.command, now) {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "command rejected");
            return Err(e);
        }
    };

    save_token(&db, &token).context("saving token state")?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_init(db: &StateDb, path: &Path) -> anyhow::Result<serde_json::Value> {
    if load_token(db).context("loading token state")?.is_some() {
        bail!("data dir already holds a token");
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading token config from {}", path.display()))?;
    let config = TokenConfig::from_json_str(&raw).context("parsing token config")?;
    let token = Token::from_config(
        &config,
        MemoryPaymentAsset::new(config.payment_decimals),
        MemoryPaymentAsset::native(),
    )
    .context("building token")?;
    save_token(db, &token).context("saving token state")?;
    info!(name = %config.name, fee_bps = config.fee_bps, "token initialised");
    Ok(json!({
        "name": config.name,
        "vault": token.settings().vault.to_b58(),
        "fee_bps": config.fee_bps,
        "payment_decimals": config.payment_decimals,
    }))
}

/// Apply one command to the loaded token.
fn run(token: &mut Token, command: Command, now: Timestamp) -> anyhow::Result<serde_json::Value> {
    let output = match command {
        Command::Init { .. } => bail!("token already initialised"),

        Command::Mint { caller, to, amount } => {
            let to = resolve_account(&to);
            token.mint(&resolve_account(&caller), &to, amount, now)?;
            json!({ "minted": amount.to_string(), "to": to.to_b58(),
                    "total_supply": token.ledger().total_supply().to_string() })
        }

        Command::Transfer { from, to, amount } => {
            let (from, to) = (resolve_account(&from), resolve_account(&to));
            token.transfer(&from, &to, amount, now)?;
            json!({ "from": from.to_b58(), "to": to.to_b58(), "amount": amount.to_string() })
        }

        Command::Burn { holder, amount } => {
            let holder = resolve_account(&holder);
            token.burn(&holder, amount, now)?;
            json!({ "burned": amount.to_string(), "holder": holder.to_b58() })
        }

        Command::Announce { caller, amount } => {
            let epoch = token.announce_distribution(&resolve_account(&caller), amount, now)?;
            json!({ "epoch": epoch, "amount": amount.to_string() })
        }

        Command::Claim { holder, native, fee_override } => {
            let holder = resolve_account(&holder);
            let receipt = token.claim(&holder, !native, fee_override.is_some(), fee_override.unwrap_or(0))?;
            json!({
                "holder": holder.to_b58(),
                "rail": receipt.rail,
                "gross": receipt.gross.to_string(),
                "fee": receipt.fee.to_string(),
                "net": receipt.net.to_string(),
                "paid": receipt.paid.to_string(),
                "decimals": receipt.decimals,
            })
        }

        Command::Pending { holder } => {
            let holder = resolve_account(&holder);
            let pending = token.query_pending(&holder)?;
            json!({ "holder": holder.to_b58(), "pending": pending.to_string() })
        }

        Command::Freeze { caller, holder } => {
            let holder = resolve_account(&holder);
            let changed = token.freeze(&resolve_account(&caller), &holder, now)?;
            json!({ "holder": holder.to_b58(), "frozen": true, "changed": changed })
        }

        Command::Unfreeze { caller, holder } => {
            let holder = resolve_account(&holder);
            let changed = token.unfreeze(&resolve_account(&caller), &holder)?;
            json!({ "holder": holder.to_b58(), "frozen": false, "changed": changed })
        }

        Command::Forward { caller, holder, target } => {
            let (holder, target) = (resolve_account(&holder), resolve_account(&target));
            token.set_forward(&resolve_account(&caller), &holder, &target)?;
            json!({ "holder": holder.to_b58(), "forward_to": target.to_b58() })
        }

        Command::Unforward { caller, holder } => {
            let holder = resolve_account(&holder);
            token.remove_forward(&resolve_account(&caller), &holder)?;
            json!({ "holder": holder.to_b58(), "forward_to": null })
        }

        Command::SetFee { caller, bps } => {
            token.set_fee(&resolve_account(&caller), bps)?;
            json!({ "fee_bps": bps })
        }

        Command::Withdraw { caller, amount } => {
            let request = amount.map_or(Withdrawal::All, Withdrawal::Amount);
            let caller = resolve_account(&caller);
            let moved = token.withdraw(&caller, request)?;
            json!({ "to": caller.to_b58(), "withdrawn": moved.to_string() })
        }

        Command::Fund { to, amount, native } => {
            let to = to.map(|a| resolve_account(&a)).unwrap_or(token.settings().vault);
            let asset = if native { token.native_mut() } else { token.payment_mut() };
            asset.fund(&to, amount)?;
            json!({ "to": to.to_b58(), "funded": amount.to_string(),
                    "balance": asset.balance_of(&to).to_string() })
        }

        Command::Status { holder } => status(token, &resolve_account(&holder), now),

        Command::ForceTransfer { caller, from, to, amount } => {
            let (from, to) = (resolve_account(&from), resolve_account(&to));
            token.force_transfer(&resolve_account(&caller), &from, &to, amount, now)?;
            json!({ "from": from.to_b58(), "to": to.to_b58(), "amount": amount.to_string() })
        }
    };
    Ok(output)
}

fn status(token: &Token, holder: &AccountId, now: Timestamp) -> serde_json::Value {
    let summary = token.holder_summary(holder, now);
    json!({
        "holder": holder.to_b58(),
        "balance": summary.balance.to_string(),
        "unlocked": summary.unlocked.to_string(),
        "locked": summary.locked.to_string(),
        "frozen": summary.frozen,
        "cached": summary.cached_amount.to_string(),
        "last_settled_epoch": summary.last_settled_epoch,
        "forward_to": summary.forward_to.map(|a| a.to_b58()),
        "forwarded_from": summary.forwarded_from,
        "current_epoch": token.engine().current_epoch(),
        "total_distributed": token.engine().log().total_distributed().to_string(),
        "lockup": LockUpQuery::new(token.lockups()).describe(holder, now),
    })
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
