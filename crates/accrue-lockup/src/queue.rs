use accrue_core::error::AccrueError;
use accrue_core::records::LockUpEntry;
use accrue_core::types::{Balance, Timestamp};
use accrue_core::SECONDS_PER_DAY;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Returns true if both timestamps fall on the same UTC calendar day.
pub fn same_utc_day(a: Timestamp, b: Timestamp) -> bool {
    match (DateTime::from_timestamp(a, 0), DateTime::from_timestamp(b, 0)) {
        (Some(da), Some(db)) => da.date_naive() == db.date_naive(),
        _ => a.div_euclid(SECONDS_PER_DAY) == b.div_euclid(SECONDS_PER_DAY),
    }
}

/// One holder's acquisition lots, oldest first.
///
/// Valid entries live in `entries[start_index..end_index]`, where
/// `end_index == entries.len()`. Lots are ordered by non-decreasing
/// `acquired_at` and consumed strictly from the front.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockUpQueue {
    entries: Vec<LockUpEntry>,
    start_index: usize,
}

impl LockUpQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.entries.len()
    }

    /// Live lots, oldest first.
    pub fn entries(&self) -> &[LockUpEntry] {
        &self.entries[self.start_index..]
    }

    /// Sum of all live lots, locked or not.
    pub fn total(&self) -> Balance {
        self.entries().iter().map(|e| e.amount).sum()
    }

    /// Record `amount` acquired at `at`.
    ///
    /// Same-day acquisitions increase the tail lot. A timestamp earlier than
    /// the tail is clamped to the tail's so the queue stays time-ordered.
    pub fn lock(&mut self, amount: Balance, at: Timestamp) -> Result<(), AccrueError> {
        if amount == 0 {
            return Ok(());
        }
        if !self.is_empty() {
            if let Some(tail) = self.entries.last_mut() {
                if same_utc_day(tail.acquired_at, at) || at < tail.acquired_at {
                    tail.amount = tail
                        .amount
                        .checked_add(amount)
                        .ok_or(AccrueError::ArithmeticOverflow)?;
                    return Ok(());
                }
            }
        }
        self.entries.push(LockUpEntry { amount, acquired_at: at });
        Ok(())
    }

    /// Units whose holding period has elapsed at `now`. Prefix sum: stops at
    /// the first lot that is still locked.
    pub fn available_unlocked(&self, now: Timestamp, min_hold_secs: i64) -> Balance {
        self.entries()
            .iter()
            .take_while(|e| now.saturating_sub(e.acquired_at) >= min_hold_secs)
            .map(|e| e.amount)
            .sum()
    }

    /// Release `amount` units from the front of the queue.
    ///
    /// All-or-nothing: when the unlocked prefix cannot cover `amount` the
    /// queue is left untouched and `InsufficientUnlockable` is returned.
    pub fn unlock(
        &mut self,
        amount: Balance,
        now: Timestamp,
        min_hold_secs: i64,
        ignore_min_hold: bool,
    ) -> Result<(), AccrueError> {
        if amount == 0 {
            return Ok(());
        }

        // Plan: index of the last lot touched and how much is left in it.
        let mut remaining = amount;
        let mut plan: Option<(usize, Balance)> = None;
        for (offset, entry) in self.entries().iter().enumerate() {
            if !ignore_min_hold && now.saturating_sub(entry.acquired_at) < min_hold_secs {
                break;
            }
            let take = remaining.min(entry.amount);
            remaining -= take;
            if remaining == 0 {
                plan = Some((self.start_index + offset, entry.amount - take));
                break;
            }
        }

        let (last, leftover) = plan.ok_or(AccrueError::InsufficientUnlockable {
            need: amount,
            have: amount - remaining,
        })?;

        // Commit.
        if leftover == 0 {
            self.start_index = last + 1;
        } else {
            self.entries[last].amount = leftover;
            self.start_index = last;
        }
        if self.is_empty() {
            self.entries.clear();
            self.start_index = 0;
        }
        Ok(())
    }
}
