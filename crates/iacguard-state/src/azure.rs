//! Azure services as seen by the evaluators.

use crate::value::{BoolValue, IntValue, Metadata, StringValue, ToRego, resource_object};
use serde_json::{Value as JsonValue, json};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Azure {
    pub storage: Storage,
    pub key_vault: KeyVault,
    pub network: Network,
    pub app_service: AppService,
}

// ---------------------------------------------------------------------------
// storage
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Storage {
    pub accounts: Vec<StorageAccount>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageAccount {
    pub metadata: Metadata,
    pub name: String,
    pub enforce_https: BoolValue,
    /// `TLS1_0`, `TLS1_1` or `TLS1_2`.
    pub minimum_tls_version: StringValue,
    pub network_rules: Vec<NetworkRule>,
    pub containers: Vec<Container>,
    pub queue_properties: QueueProperties,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkRule {
    pub metadata: Metadata,
    pub allow_by_default: BoolValue,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    pub metadata: Metadata,
    pub name: String,
    /// `None`, `Blob` or `Container`.
    pub public_access: StringValue,
}

pub const PUBLIC_ACCESS_OFF: &str = "None";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueueProperties {
    pub metadata: Metadata,
    pub enable_logging: BoolValue,
}

// ---------------------------------------------------------------------------
// key vault
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyVault {
    pub vaults: Vec<Vault>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vault {
    pub metadata: Metadata,
    pub name: String,
    pub enable_purge_protection: BoolValue,
    pub soft_delete_retention_days: IntValue,
    pub network_acls: NetworkAcls,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkAcls {
    pub metadata: Metadata,
    /// `Allow` or `Deny`.
    pub default_action: StringValue,
}

// ---------------------------------------------------------------------------
// network
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Network {
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecurityGroup {
    pub metadata: Metadata,
    pub name: String,
    pub rules: Vec<SecurityGroupRule>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecurityGroupRule {
    pub metadata: Metadata,
    pub name: String,
    pub outbound: BoolValue,
    pub allow: BoolValue,
    pub source_addresses: Vec<StringValue>,
    pub destination_ports: Vec<PortRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortRange {
    pub metadata: Metadata,
    pub start: i64,
    pub end: i64,
}

impl PortRange {
    pub fn includes(&self, port: i64) -> bool {
        self.start <= port && port <= self.end
    }
}

// ---------------------------------------------------------------------------
// app service
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppService {
    pub services: Vec<Service>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Service {
    pub metadata: Metadata,
    pub name: String,
    pub https_only: BoolValue,
    /// `1.0`, `1.1` or `1.2`.
    pub minimum_tls_version: StringValue,
}

// ---------------------------------------------------------------------------
// rego export
// ---------------------------------------------------------------------------

impl ToRego for Azure {
    fn to_rego(&self) -> JsonValue {
        json!({
            "storage": { "accounts": self.storage.accounts.to_rego() },
            "keyvault": { "vaults": self.key_vault.vaults.to_rego() },
            "network": { "securitygroups": self.network.security_groups.to_rego() },
            "appservice": { "services": self.app_service.services.to_rego() },
        })
    }
}

impl ToRego for StorageAccount {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![
                ("name", json!(self.name)),
                ("enforcehttps", self.enforce_https.to_rego()),
                ("minimumtlsversion", self.minimum_tls_version.to_rego()),
                ("networkrules", self.network_rules.to_rego()),
                ("containers", self.containers.to_rego()),
                (
                    "queueproperties",
                    resource_object(
                        &self.queue_properties.metadata,
                        vec![("enablelogging", self.queue_properties.enable_logging.to_rego())],
                    ),
                ),
            ],
        )
    }
}

impl ToRego for NetworkRule {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![("allowbydefault", self.allow_by_default.to_rego())],
        )
    }
}

impl ToRego for Container {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![
                ("name", json!(self.name)),
                ("publicaccess", self.public_access.to_rego()),
            ],
        )
    }
}

impl ToRego for Vault {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![
                ("name", json!(self.name)),
                ("enablepurgeprotection", self.enable_purge_protection.to_rego()),
                ("softdeleteretentiondays", self.soft_delete_retention_days.to_rego()),
                (
                    "networkacls",
                    resource_object(
                        &self.network_acls.metadata,
                        vec![("defaultaction", self.network_acls.default_action.to_rego())],
                    ),
                ),
            ],
        )
    }
}

impl ToRego for SecurityGroup {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![("name", json!(self.name)), ("rules", self.rules.to_rego())],
        )
    }
}

impl ToRego for SecurityGroupRule {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![
                ("name", json!(self.name)),
                ("outbound", self.outbound.to_rego()),
                ("allow", self.allow.to_rego()),
                ("sourceaddresses", self.source_addresses.to_rego()),
                ("destinationports", self.destination_ports.to_rego()),
            ],
        )
    }
}

impl ToRego for PortRange {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![("start", json!(self.start)), ("end", json!(self.end))],
        )
    }
}

impl ToRego for Service {
    fn to_rego(&self) -> JsonValue {
        resource_object(
            &self.metadata,
            vec![
                ("name", json!(self.name)),
                ("httpsonly", self.https_only.to_rego()),
                ("minimumtlsversion", self.minimum_tls_version.to_rego()),
            ],
        )
    }
}
