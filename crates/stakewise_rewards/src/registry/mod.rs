//! Vault registry: the persisted, ordered list of registered vaults.

use crate::store::{PreferenceStore, KEY_VAULT_LIST};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Seed vault when nothing has been persisted yet.
const GENESIS_VAULT_ADDRESS: &str = "0xAC0F906E433d58FA868F936E8A43230473652885";
const GENESIS_VAULT_NAME: &str = "Genesis";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("vault name and address must be non-empty")]
    EmptyField,
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

/// Supported networks for vault and rewards data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Ethereum,
    Gnosis,
}

impl Network {
    /// Lower-case form used in export filenames.
    pub fn slug(self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Gnosis => "gnosis",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Ethereum => write!(f, "Ethereum"),
            Network::Gnosis => write!(f, "Gnosis"),
        }
    }
}

impl FromStr for Network {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "gnosis" => Ok(Network::Gnosis),
            other => Err(RegistryError::UnknownNetwork(other.to_string())),
        }
    }
}

/// A registered (network, name, address) tuple. The address is treated as
/// an opaque identifier; no chain-format validation is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub network: Network,
    pub name: String,
    pub address: String,
}

impl Vault {
    pub fn new(network: Network, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network,
            name: name.into(),
            address: address.into(),
        }
    }

    fn genesis() -> Self {
        Self::new(Network::Ethereum, GENESIS_VAULT_NAME, GENESIS_VAULT_ADDRESS)
    }
}

/// Ordered vault list, mirrored to the preference store after every
/// mutation. Non-empty once initialized.
#[derive(Clone, Debug)]
pub struct VaultRegistry {
    vaults: Vec<Vault>,
}

impl VaultRegistry {
    /// Load the persisted list; absent, empty, or malformed data falls back
    /// to the Genesis seed vault, which is persisted immediately.
    pub fn initialize(store: &dyn PreferenceStore) -> Self {
        let vaults = match store.get(KEY_VAULT_LIST) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Vault>>(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "vault list read failed, falling back to default");
                Vec::new()
            }
        };
        let mut registry = Self { vaults };
        if registry.vaults.is_empty() {
            registry.vaults.push(Vault::genesis());
            registry.persist(store);
        }
        registry
    }

    /// Rewrite the full persisted list. Write failures are logged, not
    /// surfaced.
    fn persist(&self, store: &dyn PreferenceStore) {
        match serde_json::to_string(&self.vaults) {
            Ok(json) => {
                if let Err(e) = store.set(KEY_VAULT_LIST, &json) {
                    warn!(error = %e, "vault list write failed");
                }
            }
            Err(e) => warn!(error = %e, "vault list serialize failed"),
        }
    }

    /// Append a vault and persist. Duplicates are permitted; empty name or
    /// address is rejected.
    pub fn add(
        &mut self,
        store: &dyn PreferenceStore,
        vault: Vault,
    ) -> Result<(), RegistryError> {
        if vault.name.trim().is_empty() || vault.address.trim().is_empty() {
            return Err(RegistryError::EmptyField);
        }
        self.vaults.push(vault);
        self.persist(store);
        Ok(())
    }

    /// Remove the first exact (network, name, address) match and persist.
    /// Returns false (and leaves the list untouched) when nothing matches.
    pub fn remove(
        &mut self,
        store: &dyn PreferenceStore,
        network: Network,
        name: &str,
        address: &str,
    ) -> bool {
        let found = self
            .vaults
            .iter()
            .position(|v| v.network == network && v.name == name && v.address == address);
        match found {
            Some(idx) => {
                self.vaults.remove(idx);
                self.persist(store);
                true
            }
            None => false,
        }
    }

    pub fn vaults(&self) -> &[Vault] {
        &self.vaults
    }

    /// Vaults for one network, registry order preserved.
    pub fn filtered(&self, network: Network) -> Vec<Vault> {
        self.vaults
            .iter()
            .filter(|v| v.network == network)
            .cloned()
            .collect()
    }
}
