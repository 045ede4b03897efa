use super::utils::is_public_ingress;
use crate::catalog::RuleCatalog;
use crate::rule::{Results, Rule};
use iacguard_state::State;
use iacguard_types::{Framework, Severity, ids};

const SSH_PORT: i64 = 22;

pub fn register(catalog: &mut RuleCatalog) {
    catalog.register(
        Rule::new(
            ids::RULE_NETWORK_NO_PUBLIC_INGRESS,
            "Security group rules should not allow ingress from the public internet",
            Severity::Critical,
            no_public_ingress,
        )
        .with_frameworks([Framework::DEFAULT]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_NETWORK_SSH_BLOCKED,
            "SSH should not be reachable from the public internet",
            Severity::Critical,
            ssh_blocked,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
}

pub(crate) fn no_public_ingress(state: &State, results: &mut Results<'_>) {
    for group in &state.azure.network.security_groups {
        let mut failed = false;
        for rule in group.rules.iter().filter(|r| is_public_ingress(r)) {
            failed = true;
            results.fail(
                &group.name,
                format!(
                    "security group '{}' rule '{}' allows ingress from the public internet",
                    group.name, rule.name
                ),
                &rule.metadata,
            );
        }
        if !failed {
            results.pass(&group.name, &group.metadata);
        }
    }
}

pub(crate) fn ssh_blocked(state: &State, results: &mut Results<'_>) {
    for group in &state.azure.network.security_groups {
        let mut failed = false;
        for rule in &group.rules {
            if !is_public_ingress(rule) {
                continue;
            }
            if let Some(port) = rule.destination_ports.iter().find(|p| p.includes(SSH_PORT)) {
                failed = true;
                results.fail(
                    &group.name,
                    format!(
                        "security group '{}' rule '{}' exposes SSH to the public internet",
                        group.name, rule.name
                    ),
                    &port.metadata,
                );
            }
        }
        if !failed {
            results.pass(&group.name, &group.metadata);
        }
    }
}
