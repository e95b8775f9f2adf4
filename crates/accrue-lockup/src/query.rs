use accrue_core::types::{AccountId, Timestamp};
use accrue_core::SECONDS_PER_DAY;

use crate::scheduler::LockUpScheduler;

/// Query helpers for lock-up queues.
pub struct LockUpQuery<'a> {
    scheduler: &'a LockUpScheduler,
}

impl<'a> LockUpQuery<'a> {
    pub fn new(scheduler: &'a LockUpScheduler) -> Self {
        Self { scheduler }
    }

    /// Timestamp at which the oldest still-locked lot matures, if any.
    pub fn next_release_at(&self, holder: &AccountId, now: Timestamp) -> Option<Timestamp> {
        let hold = self.scheduler.min_hold_secs();
        self.scheduler
            .queue(holder)?
            .entries()
            .iter()
            .map(|e| e.acquired_at.saturating_add(hold))
            .find(|release_at| *release_at > now)
    }

    /// Human-readable summary of a holder's lock-up position.
    pub fn describe(&self, holder: &AccountId, now: Timestamp) -> String {
        let Some(queue) = self.scheduler.queue(holder) else {
            return format!("LockUp {} | no tracked lots", holder);
        };
        let unlocked = self.scheduler.available_unlocked(holder, now);
        let next = match self.next_release_at(holder, now) {
            Some(at) => format!("next release in {} days", (at - now + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY),
            None => "fully unlocked".to_string(),
        };
        format!(
            "LockUp {} | {} lots | {} tracked | {} unlocked | {}",
            holder,
            queue.entries().len(),
            queue.total(),
            unlocked,
            next
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_735_689_600;

    #[test]
    fn next_release_skips_matured_lots() {
        let mut s = LockUpScheduler::new(10 * SECONDS_PER_DAY);
        let alice = AccountId::from_label("alice");
        s.lock(&alice, 1, T0).unwrap();
        s.lock(&alice, 2, T0 + 5 * SECONDS_PER_DAY).unwrap();

        let q = LockUpQuery::new(&s);
        let now = T0 + 12 * SECONDS_PER_DAY;
        assert_eq!(q.next_release_at(&alice, now), Some(T0 + 15 * SECONDS_PER_DAY));
        assert!(q.describe(&alice, now).contains("1 unlocked"));
        assert!(q.describe(&alice, now).contains("next release in 3 days"));
    }

    #[test]
    fn describe_unknown_holder() {
        let s = LockUpScheduler::new(0);
        let bob = AccountId::from_label("bob");
        assert!(LockUpQuery::new(&s).describe(&bob, T0).contains("no tracked lots"));
    }
}
