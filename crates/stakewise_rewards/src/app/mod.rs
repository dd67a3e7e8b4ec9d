//! Application state machine tying the store, registry, selection, and
//! reward session together. All transitions are explicit method calls.

use crate::registry::{Network, RegistryError, Vault, VaultRegistry};
use crate::rewards::dates::{format_iso_date, parse_iso_date};
use crate::rewards::session::RewardsSession;
use crate::rewards::RewardRecord;
use crate::selection::{derive_selection, FormFields, SelectionView};
use crate::store::{PreferenceStore, KEY_FROM_DATE, KEY_USER_ADDRESS};
use thiserror::Error;
use time::macros::date;
use time::Date;
use tracing::warn;

/// From-date used before the user has ever saved one.
const DEFAULT_FROM_DATE: Date = date!(2023 - 11 - 29);

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("add is not enabled for the current form fields")]
    AddDisabled,
    #[error("delete is not enabled for the current selection")]
    DeleteDisabled,
    #[error("no vault is selected for the current network")]
    NoSelection,
    #[error("no such vault option: {0}")]
    UnknownOption(usize),
    #[error("a rewards fetch is already in flight")]
    FetchInFlight,
}

/// Explicit application state with persistence injected as a dependency.
pub struct App {
    store: Box<dyn PreferenceStore>,
    registry: VaultRegistry,
    network: Network,
    form: FormFields,
    chosen: Option<usize>,
    session: RewardsSession,
    fetch_in_flight: bool,
    user_address: String,
    from_date: Date,
}

impl App {
    /// Load persisted state (seeding defaults where absent) and derive the
    /// initial selection for the Ethereum network.
    pub fn initialize(store: Box<dyn PreferenceStore>) -> Self {
        let registry = VaultRegistry::initialize(store.as_ref());
        let user_address = match store.get(KEY_USER_ADDRESS) {
            Ok(Some(addr)) => addr,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "user address read failed");
                String::new()
            }
        };
        let from_date = match store.get(KEY_FROM_DATE) {
            Ok(Some(raw)) => parse_iso_date(&raw).unwrap_or(DEFAULT_FROM_DATE),
            _ => DEFAULT_FROM_DATE,
        };
        let mut app = Self {
            store,
            registry,
            network: Network::Ethereum,
            form: FormFields::default(),
            chosen: None,
            session: RewardsSession::default(),
            fetch_in_flight: false,
            user_address,
            from_date,
        };
        app.sync_form();
        app
    }

    /// Current derived view: options, selected entry, enabled actions.
    pub fn view(&self) -> SelectionView {
        derive_selection(&self.registry, self.network, &self.form, self.chosen)
    }

    /// Switch networks: recompute the selection and drop any held results.
    pub fn set_network(&mut self, network: Network) {
        if network == self.network {
            return;
        }
        self.network = network;
        self.chosen = None;
        self.session.clear();
        self.sync_form();
    }

    /// Pick an entry from the current option list. Updates the form fields
    /// immediately and clears the session.
    pub fn select_option(&mut self, index: usize) -> Result<(), AppError> {
        let view = self.view();
        if index >= view.options.len() {
            return Err(AppError::UnknownOption(index));
        }
        self.chosen = Some(index);
        self.session.clear();
        self.sync_form();
        Ok(())
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_form_address(&mut self, address: impl Into<String>) {
        self.form.address = address.into();
    }

    /// Register the vault described by the form fields on the active
    /// network. Only valid while the derived add flag is set.
    pub fn add_vault(&mut self) -> Result<(), AppError> {
        if !self.view().flags.add_enabled {
            return Err(AppError::AddDisabled);
        }
        let vault = Vault::new(self.network, self.form.name.clone(), self.form.address.clone());
        self.registry.add(self.store.as_ref(), vault)?;
        // Registry changed: reset to the auto-selected entry, drop results.
        self.chosen = None;
        self.session.clear();
        self.sync_form();
        Ok(())
    }

    /// Delete the vault matching the form tuple on the active network.
    /// Refused while only one option exists; a non-matching tuple is a
    /// silent no-op (returns false).
    pub fn delete_vault(&mut self) -> Result<bool, AppError> {
        if !self.view().flags.delete_enabled {
            return Err(AppError::DeleteDisabled);
        }
        let name = self.form.name.clone();
        let address = self.form.address.clone();
        let removed = self
            .registry
            .remove(self.store.as_ref(), self.network, &name, &address);
        if removed {
            self.chosen = None;
            self.session.clear();
            self.sync_form();
        }
        Ok(removed)
    }

    /// Persist the default user address. Empty input is ignored; write
    /// failures are logged, not surfaced.
    pub fn save_user_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if address.is_empty() {
            return;
        }
        if let Err(e) = self.store.set(KEY_USER_ADDRESS, &address) {
            warn!(error = %e, "user address write failed");
        }
        self.user_address = address;
    }

    /// Persist the default from-date.
    pub fn save_from_date(&mut self, date: Date) {
        if let Err(e) = self.store.set(KEY_FROM_DATE, &format_iso_date(date)) {
            warn!(error = %e, "from date write failed");
        }
        self.from_date = date;
    }

    /// Mark a fetch as started. At most one may be outstanding.
    pub fn begin_fetch(&mut self) -> Result<(), AppError> {
        if self.fetch_in_flight {
            return Err(AppError::FetchInFlight);
        }
        self.fetch_in_flight = true;
        Ok(())
    }

    /// Install the result of a successful fetch.
    pub fn complete_fetch(&mut self, records: Vec<RewardRecord>) {
        self.session.replace(records);
        self.fetch_in_flight = false;
    }

    /// Release the fetch guard after a failed fetch; the session keeps
    /// whatever it held.
    pub fn abort_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    /// Export filename stem: `{network}_{vault name}_rewards`, lower-cased,
    /// spaces replaced with underscores.
    pub fn export_stem(&self) -> Result<String, AppError> {
        let view = self.view();
        let selected = view.selected.ok_or(AppError::NoSelection)?;
        Ok(format!(
            "{}_{}_rewards",
            self.network.slug(),
            selected.name.to_lowercase().replace(' ', "_")
        ))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    pub fn session(&self) -> &RewardsSession {
        &self.session
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    pub fn from_date(&self) -> Date {
        self.from_date
    }

    /// Mirror the selected option into the form fields, or clear them when
    /// no vault matches the active network.
    fn sync_form(&mut self) {
        match self.view().selected {
            Some(selected) => {
                self.form.name = selected.name;
                self.form.address = selected.address;
            }
            None => {
                self.form.name.clear();
                self.form.address.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, KEY_VAULT_LIST};
    use time::Month;

    fn new_app() -> App {
        App::initialize(Box::new(MemoryStore::new()))
    }

    fn sample_records() -> Vec<RewardRecord> {
        vec![RewardRecord {
            date: Date::from_calendar_date(2023, Month::November, 14).unwrap(),
            daily_reward: 1.5,
            daily_reward_gbp: 1.2,
        }]
    }

    #[test]
    fn init_seeds_genesis_and_auto_selects_it() {
        let app = new_app();
        let view = app.view();
        assert_eq!(view.options.len(), 1);
        assert_eq!(view.selected.as_ref().unwrap().name, "Genesis");
        assert!(!view.flags.delete_enabled);
        assert_eq!(app.form().name, "Genesis");
        assert_eq!(app.from_date(), date!(2023 - 11 - 29));
        assert_eq!(app.user_address(), "");
    }

    #[test]
    fn adding_second_vault_enables_delete() {
        let mut app = new_app();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        let view = app.view();
        assert_eq!(view.options.len(), 2);
        assert!(view.flags.delete_enabled);
        // After a registry change the form snaps back to the auto-selected
        // first entry.
        assert_eq!(app.form().name, "Genesis");
    }

    #[test]
    fn add_refused_when_form_matches_existing_entry() {
        let mut app = new_app();
        // sync_form left the Genesis tuple in the form fields.
        assert!(matches!(app.add_vault(), Err(AppError::AddDisabled)));
    }

    #[test]
    fn delete_refused_for_sole_vault() {
        let mut app = new_app();
        assert!(matches!(app.delete_vault(), Err(AppError::DeleteDisabled)));
    }

    #[test]
    fn delete_of_unmatched_tuple_is_noop() {
        let mut app = new_app();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        app.set_form_name("nope");
        app.set_form_address("0x0");
        assert!(!app.delete_vault().unwrap());
        assert_eq!(app.view().options.len(), 2);
    }

    #[test]
    fn network_switch_clears_session_and_selection() {
        let mut app = new_app();
        app.begin_fetch().unwrap();
        app.complete_fetch(sample_records());
        assert!(!app.session().is_empty());
        app.set_network(Network::Gnosis);
        assert!(app.session().is_empty());
        assert!(app.view().selected.is_none());
        assert_eq!(app.form().name, "");
        // Switching back re-derives the Ethereum selection.
        app.set_network(Network::Ethereum);
        assert_eq!(app.view().selected.as_ref().unwrap().name, "Genesis");
    }

    #[test]
    fn selecting_another_option_clears_session() {
        let mut app = new_app();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        app.begin_fetch().unwrap();
        app.complete_fetch(sample_records());
        app.select_option(1).unwrap();
        assert!(app.session().is_empty());
        assert_eq!(app.form().name, "Vault B");
        assert!(matches!(
            app.select_option(7),
            Err(AppError::UnknownOption(7))
        ));
    }

    #[test]
    fn registry_mutation_clears_session() {
        let mut app = new_app();
        app.begin_fetch().unwrap();
        app.complete_fetch(sample_records());
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        assert!(app.session().is_empty());
    }

    #[test]
    fn one_fetch_in_flight_at_a_time() {
        let mut app = new_app();
        app.begin_fetch().unwrap();
        assert!(matches!(app.begin_fetch(), Err(AppError::FetchInFlight)));
        app.abort_fetch();
        app.begin_fetch().unwrap();
        app.complete_fetch(sample_records());
        app.begin_fetch().unwrap();
    }

    #[test]
    fn failed_fetch_keeps_prior_session() {
        let mut app = new_app();
        app.begin_fetch().unwrap();
        app.complete_fetch(sample_records());
        app.begin_fetch().unwrap();
        app.abort_fetch();
        assert_eq!(app.session().records().len(), 1);
    }

    #[test]
    fn defaults_persist_through_store() {
        let store = Box::new(MemoryStore::new());
        let mut app = App::initialize(store);
        app.save_user_address("0xUSER");
        app.save_from_date(date!(2024 - 02 - 01));
        assert_eq!(app.user_address(), "0xUSER");
        assert_eq!(app.from_date(), date!(2024 - 02 - 01));
        // Empty address writes are ignored.
        app.save_user_address("");
        assert_eq!(app.user_address(), "0xUSER");
    }

    #[test]
    fn persisted_registry_matches_memory_after_mutations() {
        let mut app = new_app();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.delete_vault().unwrap();
        let raw = app.store.get(KEY_VAULT_LIST).unwrap().unwrap();
        let persisted: Vec<Vault> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, app.registry().vaults());
    }

    #[test]
    fn export_stem_lowercases_and_underscores() {
        let mut app = new_app();
        app.set_form_name("Vault B");
        app.set_form_address("0xBEEF");
        app.add_vault().unwrap();
        app.select_option(1).unwrap();
        assert_eq!(app.export_stem().unwrap(), "ethereum_vault_b_rewards");
        app.set_network(Network::Gnosis);
        assert!(matches!(app.export_stem(), Err(AppError::NoSelection)));
    }
}
