//! Derived selection state: which vaults are offered for the active
//! network, which one is selected, and which actions are enabled.

use crate::registry::{Network, VaultRegistry};

/// The active (network, name, address) triple driving queries and export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub network: Network,
    pub name: String,
    pub address: String,
}

impl Selection {
    /// Display label in the original selector's `Name: address` form.
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.address)
    }
}

/// Free-form vault name/address fields, as edited by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub address: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiFlags {
    pub add_enabled: bool,
    pub delete_enabled: bool,
}

/// Everything derived from registry + network + form state.
#[derive(Clone, Debug)]
pub struct SelectionView {
    /// Vaults matching the active network, registry order preserved.
    pub options: Vec<Selection>,
    pub selected: Option<Selection>,
    pub flags: UiFlags,
}

/// Pure derivation of the selection view. `chosen` is an explicit user
/// pick into `options`; out-of-range or absent picks fall back to the
/// first option (auto-select).
pub fn derive_selection(
    registry: &VaultRegistry,
    network: Network,
    form: &FormFields,
    chosen: Option<usize>,
) -> SelectionView {
    let options: Vec<Selection> = registry
        .filtered(network)
        .into_iter()
        .map(|v| Selection {
            network: v.network,
            name: v.name,
            address: v.address,
        })
        .collect();

    let index = chosen.filter(|i| *i < options.len()).unwrap_or(0);
    let selected = options.get(index).cloned();

    let form_is_new = !form.name.trim().is_empty()
        && !form.address.trim().is_empty()
        && !options
            .iter()
            .any(|o| o.name == form.name && o.address == form.address);

    SelectionView {
        flags: UiFlags {
            add_enabled: form_is_new,
            delete_enabled: options.len() > 1,
        },
        selected,
        options,
    }
}
