//! accrue-state
//!
//! Epoch-indexed lazy-settlement accounting. The distribution log, the
//! sparse balance history, and the holder status table are composed in
//! `DistributionEngine`; settlement walks only the epochs a holder has not
//! yet settled and only the history entries that can still matter.

pub mod db;
pub mod engine;
pub mod guard;
pub mod history;
pub mod holders;
pub mod log;
pub mod settlement;

pub use db::StateDb;
pub use engine::DistributionEngine;
pub use guard::{CallGuard, ReentrancyLock};
pub use history::BalanceHistory;
pub use holders::HolderTable;
pub use log::DistributionLog;
pub use settlement::SettlementBatch;
