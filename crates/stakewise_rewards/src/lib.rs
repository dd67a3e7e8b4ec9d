//! stakewise_rewards — local-first vault rewards tracker for StakeWise.
//!
//! Registers (network, name, address) vault tuples, retrieves daily reward
//! history for a vault/user pair, and hands the results to display/export.
//! Read-only; no keys; no transaction signing.

pub mod app;
pub mod registry;
pub mod rewards;
pub mod selection;
pub mod store;

pub use app::{App, AppError};
pub use registry::{Network, RegistryError, Vault, VaultRegistry};
pub use rewards::client::{
    convert_records, ClientConfig, RewardsClient, RewardsError, RewardsQuery, UpstreamReward,
};
pub use rewards::session::RewardsSession;
pub use rewards::RewardRecord;
pub use selection::{derive_selection, FormFields, Selection, SelectionView, UiFlags};
pub use store::{MemoryStore, PreferenceStore, SqliteStore, StoreError};
