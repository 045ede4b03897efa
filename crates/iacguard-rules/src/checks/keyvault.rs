use crate::catalog::RuleCatalog;
use crate::rule::{Results, Rule};
use iacguard_state::State;
use iacguard_types::{Framework, Severity, ids};

pub fn register(catalog: &mut RuleCatalog) {
    catalog.register(
        Rule::new(
            ids::RULE_KEYVAULT_PURGE_PROTECTION,
            "Key vaults should have purge protection enabled",
            Severity::Medium,
            purge_protection,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_KEYVAULT_DEFAULT_DENY,
            "Key vault network ACLs should deny access by default",
            Severity::Critical,
            default_deny,
        )
        .with_frameworks([Framework::DEFAULT]),
    );
}

pub(crate) fn purge_protection(state: &State, results: &mut Results<'_>) {
    for vault in &state.azure.key_vault.vaults {
        if vault.enable_purge_protection.is_true() {
            results.pass(&vault.name, &vault.metadata);
        } else {
            results.fail(
                &vault.name,
                format!("key vault '{}' does not enable purge protection", vault.name),
                &vault.enable_purge_protection.metadata,
            );
        }
    }
}

pub(crate) fn default_deny(state: &State, results: &mut Results<'_>) {
    for vault in &state.azure.key_vault.vaults {
        let action = &vault.network_acls.default_action;
        if action.equals_ignore_case("Deny") {
            results.pass(&vault.name, &vault.metadata);
        } else {
            results.fail(
                &vault.name,
                format!("key vault '{}' network ACLs allow access by default", vault.name),
                &action.metadata,
            );
        }
    }
}
