use accrue_core::error::AccrueError;
use accrue_core::records::DistributionRecord;
use accrue_core::types::{Balance, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

/// Append-only sequence of payout announcements.
///
/// The epoch counter is the log length: epoch `i` is pending until record
/// `i` exists, and announcing seals it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionLog {
    records: Vec<DistributionRecord>,
}

impl DistributionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records, which must be numbered 0..n.
    pub fn from_records(records: Vec<DistributionRecord>) -> Result<Self, AccrueError> {
        for (i, r) in records.iter().enumerate() {
            if r.epoch != i as Epoch {
                return Err(AccrueError::Storage(format!(
                    "distribution log gap: slot {} holds epoch {}",
                    i, r.epoch
                )));
            }
        }
        Ok(Self { records })
    }

    pub fn current_epoch(&self) -> Epoch {
        self.records.len() as Epoch
    }

    /// Seal the current epoch with `amount` against `total_supply` and
    /// advance the counter. Returns the sealed epoch.
    pub fn announce(
        &mut self,
        amount: Balance,
        total_supply: Balance,
        now: Timestamp,
    ) -> Result<Epoch, AccrueError> {
        if amount == 0 {
            return Err(AccrueError::ZeroAmount);
        }
        if total_supply == 0 {
            return Err(AccrueError::ZeroSupply);
        }
        let epoch = self.current_epoch();
        self.records.push(DistributionRecord {
            epoch,
            amount,
            total_supply_snapshot: total_supply,
            announced_at: now,
        });
        Ok(epoch)
    }

    pub fn get(&self, epoch: Epoch) -> Option<&DistributionRecord> {
        usize::try_from(epoch).ok().and_then(|i| self.records.get(i))
    }

    pub fn records(&self) -> &[DistributionRecord] {
        &self.records
    }

    /// Total amount ever announced.
    pub fn total_distributed(&self) -> Balance {
        self.records.iter().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announce_advances_epoch() {
        let mut log = DistributionLog::new();
        assert_eq!(log.current_epoch(), 0);
        assert_eq!(log.announce(100, 10, 1).unwrap(), 0);
        assert_eq!(log.announce(200, 20, 2).unwrap(), 1);
        assert_eq!(log.current_epoch(), 2);
        assert_eq!(log.get(1).unwrap().total_supply_snapshot, 20);
        assert!(log.get(2).is_none());
        assert_eq!(log.total_distributed(), 300);
    }

    #[test]
    fn zero_amount_or_supply_rejected_without_advancing() {
        let mut log = DistributionLog::new();
        assert_eq!(log.announce(0, 10, 1), Err(AccrueError::ZeroAmount));
        assert_eq!(log.announce(10, 0, 1), Err(AccrueError::ZeroSupply));
        assert_eq!(log.current_epoch(), 0);
    }

    #[test]
    fn from_records_rejects_gaps() {
        let rec = DistributionRecord { epoch: 1, amount: 1, total_supply_snapshot: 1, announced_at: 0 };
        assert!(DistributionLog::from_records(vec![rec]).is_err());
    }
}
