use crate::catalog::RuleCatalog;
use crate::rule::{Results, Rule};
use iacguard_state::State;
use iacguard_state::azure::PUBLIC_ACCESS_OFF;
use iacguard_types::{Framework, Severity, ids};

pub fn register(catalog: &mut RuleCatalog) {
    catalog.register(
        Rule::new(
            ids::RULE_STORAGE_ENFORCE_HTTPS,
            "Storage accounts should only accept HTTPS traffic",
            Severity::High,
            enforce_https,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_STORAGE_MIN_TLS,
            "Storage accounts should require TLS 1.2",
            Severity::Critical,
            minimum_tls,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_STORAGE_DEFAULT_DENY,
            "Storage network rules should deny access by default",
            Severity::Critical,
            default_deny,
        )
        .with_frameworks([Framework::DEFAULT]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_STORAGE_NO_PUBLIC_ACCESS,
            "Blob containers should not allow public access",
            Severity::High,
            no_public_access,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_STORAGE_QUEUE_LOGGING,
            "Storage queue services should log requests",
            Severity::Medium,
            queue_logging,
        )
        .with_frameworks([Framework::DEFAULT])
        .deprecated(true),
    );
}

pub(crate) fn enforce_https(state: &State, results: &mut Results<'_>) {
    for account in &state.azure.storage.accounts {
        if account.enforce_https.is_false() {
            results.fail(
                &account.name,
                format!("storage account '{}' accepts plain HTTP traffic", account.name),
                &account.enforce_https.metadata,
            );
        } else {
            results.pass(&account.name, &account.metadata);
        }
    }
}

pub(crate) fn minimum_tls(state: &State, results: &mut Results<'_>) {
    for account in &state.azure.storage.accounts {
        if account.minimum_tls_version.equals_ignore_case("TLS1_2") {
            results.pass(&account.name, &account.metadata);
        } else {
            results.fail(
                &account.name,
                format!(
                    "storage account '{}' allows TLS older than 1.2 ({})",
                    account.name, account.minimum_tls_version.value
                ),
                &account.minimum_tls_version.metadata,
            );
        }
    }
}

pub(crate) fn default_deny(state: &State, results: &mut Results<'_>) {
    for account in &state.azure.storage.accounts {
        let mut failed = false;
        for rule in &account.network_rules {
            if rule.allow_by_default.is_true() {
                failed = true;
                results.fail(
                    &account.name,
                    format!("storage account '{}' network rules allow access by default", account.name),
                    &rule.allow_by_default.metadata,
                );
            }
        }
        if !failed {
            results.pass(&account.name, &account.metadata);
        }
    }
}

pub(crate) fn no_public_access(state: &State, results: &mut Results<'_>) {
    for account in &state.azure.storage.accounts {
        for container in &account.containers {
            if container.public_access.equals_ignore_case(PUBLIC_ACCESS_OFF) {
                results.pass(&container.name, &container.metadata);
            } else {
                results.fail(
                    &container.name,
                    format!(
                        "container '{}' allows public access level '{}'",
                        container.name, container.public_access.value
                    ),
                    &container.public_access.metadata,
                );
            }
        }
    }
}

pub(crate) fn queue_logging(state: &State, results: &mut Results<'_>) {
    for account in &state.azure.storage.accounts {
        let queue = &account.queue_properties;
        if queue.enable_logging.is_true() {
            results.pass(&account.name, &queue.metadata);
        } else {
            results.fail(
                &account.name,
                format!("storage account '{}' does not log queue requests", account.name),
                &queue.enable_logging.metadata,
            );
        }
    }
}
