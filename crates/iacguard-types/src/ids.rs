//! Stable identifiers for builtin rules and result codes.
//!
//! Rule ids follow the `AZU-NNNN` numbering. `code` is a short snake_case discriminator.

// Rules: storage
pub const RULE_STORAGE_ENFORCE_HTTPS: &str = "AZU-0008";
pub const RULE_STORAGE_MIN_TLS: &str = "AZU-0011";
pub const RULE_STORAGE_DEFAULT_DENY: &str = "AZU-0012";
pub const RULE_STORAGE_NO_PUBLIC_ACCESS: &str = "AZU-0007";
pub const RULE_STORAGE_QUEUE_LOGGING: &str = "AZU-0009";

// Rules: keyvault
pub const RULE_KEYVAULT_PURGE_PROTECTION: &str = "AZU-0016";
pub const RULE_KEYVAULT_DEFAULT_DENY: &str = "AZU-0013";

// Rules: network
pub const RULE_NETWORK_NO_PUBLIC_INGRESS: &str = "AZU-0047";
pub const RULE_NETWORK_SSH_BLOCKED: &str = "AZU-0050";

// Rules: appservice
pub const RULE_APPSERVICE_HTTPS_ONLY: &str = "AZU-0004";
pub const RULE_APPSERVICE_MIN_TLS: &str = "AZU-0006";

// Codes
pub const CODE_VIOLATION: &str = "violation";
pub const CODE_PASSED: &str = "passed";
pub const CODE_RULE_FAULT: &str = "rule_fault";
pub const CODE_POLICY_DENY: &str = "policy_deny";
