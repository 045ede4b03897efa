use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A named grouping of rules (a compliance benchmark, or the default set).
///
/// Frameworks are open-ended: a rule author may tag a rule with any name, and selecting an
/// unknown framework simply matches nothing.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Framework(Cow<'static, str>);

impl Framework {
    /// Assigned to rules registered without an explicit framework.
    pub const DEFAULT: Framework = Framework(Cow::Borrowed("default"));
    /// Selecting this framework selects every registered rule.
    pub const ALL: Framework = Framework(Cow::Borrowed("all"));
    pub const CIS_AZURE_1_3: Framework = Framework(Cow::Borrowed("cis-azure-1.3"));

    pub fn new<S: Into<String>>(name: S) -> Self {
        Framework(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Framework {
    fn from(value: &str) -> Self {
        Framework::new(value)
    }
}
