use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_CONFIG_V1: &str = "iacguard.config.v1";

/// `iacguard.toml` schema v1.
///
/// Every field is optional so an empty file is a valid config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IacguardConfigV1 {
    /// Optional schema string for tooling (`iacguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Compliance frameworks whose rules run. Empty means `default`; `all` selects everything.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rego_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_deprecated_checks: Option<bool>,

    /// Abort the scan after this many seconds. `0` disables the deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Globs, relative to the scanned root, of template files to skip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub policies: PoliciesConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PoliciesConfig {
    /// Directories of `*.rego` files. Relative paths resolve against the scanned root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<String>,

    /// Top-level Rego namespaces that are evaluated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}
