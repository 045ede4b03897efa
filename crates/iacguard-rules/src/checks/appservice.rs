use crate::catalog::RuleCatalog;
use crate::rule::{Results, Rule};
use iacguard_state::State;
use iacguard_types::{Framework, Severity, ids};

pub fn register(catalog: &mut RuleCatalog) {
    catalog.register(
        Rule::new(
            ids::RULE_APPSERVICE_HTTPS_ONLY,
            "App services should only be reachable over HTTPS",
            Severity::High,
            https_only,
        )
        .with_frameworks([Framework::DEFAULT]),
    );
    catalog.register(
        Rule::new(
            ids::RULE_APPSERVICE_MIN_TLS,
            "App services should require TLS 1.2",
            Severity::High,
            minimum_tls,
        )
        .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]),
    );
}

pub(crate) fn https_only(state: &State, results: &mut Results<'_>) {
    for service in &state.azure.app_service.services {
        if service.https_only.is_true() {
            results.pass(&service.name, &service.metadata);
        } else {
            results.fail(
                &service.name,
                format!("app service '{}' accepts plain HTTP traffic", service.name),
                &service.https_only.metadata,
            );
        }
    }
}

pub(crate) fn minimum_tls(state: &State, results: &mut Results<'_>) {
    for service in &state.azure.app_service.services {
        let tls = &service.minimum_tls_version;
        if matches!(tls.value.as_str(), "1.2" | "1.3") {
            results.pass(&service.name, &service.metadata);
        } else {
            results.fail(
                &service.name,
                format!(
                    "app service '{}' allows TLS older than 1.2 ({})",
                    service.name, tls.value
                ),
                &tls.metadata,
            );
        }
    }
}
