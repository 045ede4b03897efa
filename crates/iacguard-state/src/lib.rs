//! Canonical deployment state (no IO).
//!
//! Input: a deployment adapted elsewhere from a parsed template.
//! Output: a typed snapshot both evaluators read, exportable to the policy engine's input format.
//!
//! A `State` is always fully built before evaluation starts; nothing here streams.

#![forbid(unsafe_code)]

pub mod azure;
mod value;

pub use azure::Azure;
pub use value::{BoolValue, IntValue, Metadata, StringValue, ToRego, Value};

use serde_json::{Value as JsonValue, json};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub azure: Azure,
}

impl State {
    /// True when the adapter recognised no resources at all.
    pub fn is_empty(&self) -> bool {
        let a = &self.azure;
        a.storage.accounts.is_empty()
            && a.key_vault.vaults.is_empty()
            && a.network.security_groups.is_empty()
            && a.app_service.services.is_empty()
    }

    /// Serialized facts for the policy engine. Deterministic for a given state.
    pub fn to_rego(&self) -> JsonValue {
        json!({ "azure": self.azure.to_rego() })
    }
}
