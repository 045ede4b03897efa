use super::{Located, Props};
use crate::parse::ArmDeployment;
use iacguard_state::azure::{Container, NetworkRule, QueueProperties, Storage, StorageAccount};
use iacguard_state::{Metadata, Value};

const ACCOUNT: &str = "Microsoft.Storage/storageAccounts";
const CONTAINER: &str = "Microsoft.Storage/storageAccounts/blobServices/containers";
const QUEUE_SERVICE: &str = "Microsoft.Storage/storageAccounts/queueServices";

pub(super) fn adapt(deployment: &ArmDeployment, resources: &[Located<'_>]) -> Storage {
    let accounts = resources
        .iter()
        .filter(|r| r.is(ACCOUNT))
        .map(|r| account(deployment, r, resources))
        .collect();
    Storage { accounts }
}

fn account(deployment: &ArmDeployment, located: &Located<'_>, all: &[Located<'_>]) -> StorageAccount {
    let props = Props::of(deployment, located.resource);
    let metadata = props.own_metadata();

    let network_rules = props
        .node(&["networkAcls"])
        .map(|acls| {
            let acl = Props::at(deployment, acls);
            let action = acl.string(&["defaultAction"], "Allow");
            vec![NetworkRule {
                metadata: acl.own_metadata(),
                allow_by_default: Value::new(
                    action.equals_ignore_case("Allow"),
                    action.metadata.clone(),
                ),
            }]
        })
        .unwrap_or_default();

    let containers = all
        .iter()
        .filter(|r| r.is(CONTAINER) && r.belongs_to(&located.name))
        .map(|r| {
            let c = Props::of(deployment, r.resource);
            Container {
                metadata: c.own_metadata(),
                name: r.short_name().to_string(),
                public_access: c.string(&["publicAccess"], "None"),
            }
        })
        .collect();

    StorageAccount {
        metadata: metadata.clone(),
        name: located.name.clone(),
        enforce_https: props.bool(&["supportsHttpsTrafficOnly"], true),
        minimum_tls_version: props.string(&["minimumTlsVersion"], "TLS1_0"),
        network_rules,
        containers,
        queue_properties: queue_properties(deployment, located, all, metadata),
    }
}

/// Logging counts as enabled when any of read, write or delete logging is on.
fn queue_properties(
    deployment: &ArmDeployment,
    account: &Located<'_>,
    all: &[Located<'_>],
    account_metadata: Metadata,
) -> QueueProperties {
    let service = all
        .iter()
        .find(|r| r.is(QUEUE_SERVICE) && r.belongs_to(&account.name));
    let Some(service) = service else {
        return QueueProperties {
            metadata: Metadata::defaulted(account_metadata.range.clone()),
            enable_logging: Value::new(false, Metadata::defaulted(account_metadata.range)),
        };
    };

    let props = Props::of(deployment, service.resource);
    let enabled = ["read", "write", "delete"]
        .iter()
        .any(|op| props.bool(&["logging", *op], false).is_true());
    QueueProperties {
        metadata: props.own_metadata(),
        enable_logging: Value::new(enabled, props.metadata(&["logging"])),
    }
}
