//! Rewards retrieval: upstream client adapter, timestamp/date handling,
//! and the in-memory result session.

pub mod client;
pub mod dates;
pub mod session;

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One day's staking reward, in native and GBP-equivalent units, as held
/// for display and export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub daily_reward: f64,
    pub daily_reward_gbp: f64,
}
