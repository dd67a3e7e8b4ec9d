//! Holds the most recent successful fetch for display and export.

use crate::rewards::RewardRecord;

/// Exactly one ordered record sequence at a time. Replaced wholesale on a
/// successful fetch; cleared whenever the network, registry, or selection
/// changes so stale results are never shown against a mismatched selection.
#[derive(Debug, Default)]
pub struct RewardsSession {
    records: Vec<RewardRecord>,
}

impl RewardsSession {
    pub fn replace(&mut self, records: Vec<RewardRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[RewardRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    fn record(day: u8) -> RewardRecord {
        RewardRecord {
            date: Date::from_calendar_date(2023, Month::November, day).unwrap(),
            daily_reward: 1.0,
            daily_reward_gbp: 0.8,
        }
    }

    #[test]
    fn replace_is_wholesale() {
        let mut session = RewardsSession::default();
        session.replace(vec![record(14), record(15)]);
        assert_eq!(session.records().len(), 2);
        session.replace(vec![record(16)]);
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records()[0], record(16));
    }

    #[test]
    fn clear_empties_regardless_of_contents() {
        let mut session = RewardsSession::default();
        session.replace(vec![record(14)]);
        session.clear();
        assert!(session.is_empty());
        session.clear();
        assert!(session.is_empty());
    }
}
