//! Upstream rewards-service client, one instance per network.

use crate::registry::Network;
use crate::rewards::dates::timestamp_ms_to_date;
use crate::rewards::RewardRecord;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use time::UtcOffset;
use tracing::debug;

const MAINNET_API_URL: &str = "https://mainnet-api.stakewise.io";
const GNOSIS_API_URL: &str = "https://gnosis-api.stakewise.io";
const USER_REWARDS_PATH: &str = "/vaults/user-rewards";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error: status {0} body {1}")]
    Api(u16, String),
    #[error("parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("timestamp out of range: {0}")]
    Timestamp(i64),
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn for_network(network: Network) -> Self {
        let base_url = match network {
            Network::Ethereum => MAINNET_API_URL,
            Network::Gnosis => GNOSIS_API_URL,
        };
        Self {
            base_url: base_url.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

/// One rewards query: a millisecond window plus the user/vault pair.
#[derive(Clone, Debug)]
pub struct RewardsQuery {
    pub date_from_ms: i64,
    pub date_to_ms: i64,
    pub user_address: String,
    pub vault_address: String,
}

/// Daily reward as returned by the service. `date` is epoch milliseconds.
#[derive(Clone, Deserialize)]
pub struct UpstreamReward {
    pub date: i64,
    #[serde(rename = "dailyRewards")]
    pub daily_rewards: f64,
    #[serde(rename = "dailyRewardsGbp")]
    pub daily_rewards_gbp: f64,
}

/// Rewards client bound to one network's endpoint. Rebuilt whenever the
/// network changes; instances share no state.
pub struct RewardsClient {
    config: ClientConfig,
    client: reqwest::Client,
    offset: UtcOffset,
}

impl RewardsClient {
    pub fn for_network(network: Network, offset: UtcOffset) -> Result<Self, RewardsError> {
        Self::new(ClientConfig::for_network(network), offset)
    }

    /// `offset` is the zone used to truncate upstream timestamps to
    /// calendar days (the caller's local offset in normal use).
    pub fn new(config: ClientConfig, offset: UtcOffset) -> Result<Self, RewardsError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            client,
            offset,
        })
    }

    /// Run one rewards query. Failures are not retried; they propagate to
    /// the caller to surface.
    pub async fn fetch_rewards(
        &self,
        query: &RewardsQuery,
    ) -> Result<Vec<RewardRecord>, RewardsError> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            USER_REWARDS_PATH
        );
        let body = serde_json::json!({
            "dateFrom": query.date_from_ms,
            "dateTo": query.date_to_ms,
            "userAddress": query.user_address,
            "vaultAddress": query.vault_address,
        });
        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(RewardsError::Api(status.as_u16(), text));
        }
        let upstream: Vec<UpstreamReward> = serde_json::from_str(&text)?;
        debug!(count = upstream.len(), vault = %query.vault_address, "user rewards fetched");
        convert_records(&upstream, self.offset)
    }
}

/// Map upstream records to display records: timestamp truncated to a
/// calendar day at `offset`, reward fields copied verbatim.
pub fn convert_records(
    upstream: &[UpstreamReward],
    offset: UtcOffset,
) -> Result<Vec<RewardRecord>, RewardsError> {
    upstream
        .iter()
        .map(|r| {
            Ok(RewardRecord {
                date: timestamp_ms_to_date(r.date, offset)?,
                daily_reward: r.daily_rewards,
                daily_reward_gbp: r.daily_rewards_gbp,
            })
        })
        .collect()
}
