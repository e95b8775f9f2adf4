//! accrue-lockup
//!
//! FIFO lock-up scheduler. Every acquisition of balance units is recorded as
//! a lot in the holder's queue; outgoing movements consume lots from the
//! front once their minimum holding period has elapsed. Lots acquired on the
//! same UTC calendar day coalesce into one entry.

pub mod query;
pub mod queue;
pub mod scheduler;

pub use query::LockUpQuery;
pub use queue::{same_utc_day, LockUpQueue};
pub use scheduler::LockUpScheduler;
