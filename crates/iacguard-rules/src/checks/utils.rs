use iacguard_state::azure::SecurityGroupRule;

const PUBLIC_SOURCES: [&str; 5] = ["*", "0.0.0.0", "0.0.0.0/0", "internet", "any"];

/// Whether an address prefix admits traffic from anywhere.
pub fn is_public_source(prefix: &str) -> bool {
    let p = prefix.trim().to_ascii_lowercase();
    PUBLIC_SOURCES.contains(&p.as_str()) || p == "::/0"
}

/// Inbound allow rule with at least one public source address.
pub fn is_public_ingress(rule: &SecurityGroupRule) -> bool {
    !rule.outbound.value
        && rule.allow.value
        && rule
            .source_addresses
            .iter()
            .any(|addr| is_public_source(&addr.value))
}
