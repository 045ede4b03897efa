use super::{Located, Props};
use crate::parse::ArmDeployment;
use iacguard_state::Metadata;
use iacguard_state::azure::{KeyVault, NetworkAcls, Vault};

const VAULT: &str = "Microsoft.KeyVault/vaults";

pub(super) fn adapt(deployment: &ArmDeployment, resources: &[Located<'_>]) -> KeyVault {
    let vaults = resources
        .iter()
        .filter(|r| r.is(VAULT))
        .map(|r| {
            let props = Props::of(deployment, r.resource);
            let network_acls = match props.node(&["networkAcls"]) {
                Some(acls) => {
                    let acl = Props::at(deployment, acls);
                    NetworkAcls {
                        metadata: acl.own_metadata(),
                        default_action: acl.string(&["defaultAction"], "Allow"),
                    }
                }
                None => NetworkAcls {
                    metadata: Metadata::defaulted(props.own_metadata().range),
                    default_action: props.string(&["networkAcls", "defaultAction"], "Allow"),
                },
            };
            Vault {
                metadata: props.own_metadata(),
                name: r.name.clone(),
                enable_purge_protection: props.bool(&["enablePurgeProtection"], false),
                soft_delete_retention_days: props.int(&["softDeleteRetentionInDays"], 90),
                network_acls,
            }
        })
        .collect();
    KeyVault { vaults }
}
