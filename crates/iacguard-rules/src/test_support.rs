use iacguard_state::azure::{
    Container, NetworkAcls, NetworkRule, PortRange, QueueProperties, SecurityGroup,
    SecurityGroupRule, Service, StorageAccount, Vault,
};
use iacguard_state::{Metadata, State, Value};
use iacguard_types::{Range, SourcePath};

pub fn meta(line: u32) -> Metadata {
    Metadata::new(Range::new(SourcePath::new("azuredeploy.json"), line, line + 1))
}

pub fn storage_account(name: &str, https: bool, tls: &str) -> StorageAccount {
    StorageAccount {
        metadata: meta(10),
        name: name.to_string(),
        enforce_https: Value::new(https, meta(12)),
        minimum_tls_version: Value::new(tls.to_string(), meta(13)),
        network_rules: vec![NetworkRule {
            metadata: meta(14),
            allow_by_default: Value::new(false, meta(15)),
        }],
        containers: Vec::new(),
        queue_properties: QueueProperties {
            metadata: meta(16),
            enable_logging: Value::new(true, meta(17)),
        },
    }
}

pub fn state_with_account(name: &str, https: bool, tls: &str) -> State {
    let mut state = State::default();
    state.azure.storage.accounts.push(storage_account(name, https, tls));
    state
}

pub fn container(name: &str, public_access: &str) -> Container {
    Container {
        metadata: meta(20),
        name: name.to_string(),
        public_access: Value::new(public_access.to_string(), meta(21)),
    }
}

pub fn vault(name: &str, purge_protection: bool, default_action: &str) -> Vault {
    Vault {
        metadata: meta(30),
        name: name.to_string(),
        enable_purge_protection: Value::new(purge_protection, meta(31)),
        soft_delete_retention_days: Value::new(90, meta(32)),
        network_acls: NetworkAcls {
            metadata: meta(33),
            default_action: Value::new(default_action.to_string(), meta(34)),
        },
    }
}

pub fn nsg_rule(name: &str, source: &str, ports: &[(i64, i64)]) -> SecurityGroupRule {
    SecurityGroupRule {
        metadata: meta(40),
        name: name.to_string(),
        outbound: Value::new(false, meta(41)),
        allow: Value::new(true, meta(42)),
        source_addresses: vec![Value::new(source.to_string(), meta(43))],
        destination_ports: ports
            .iter()
            .map(|(start, end)| PortRange {
                metadata: meta(44),
                start: *start,
                end: *end,
            })
            .collect(),
    }
}

pub fn security_group(name: &str, rules: Vec<SecurityGroupRule>) -> SecurityGroup {
    SecurityGroup {
        metadata: meta(38),
        name: name.to_string(),
        rules,
    }
}

pub fn service(name: &str, https_only: bool, tls: &str) -> Service {
    Service {
        metadata: meta(50),
        name: name.to_string(),
        https_only: Value::new(https_only, meta(51)),
        minimum_tls_version: Value::new(tls.to_string(), meta(52)),
    }
}
