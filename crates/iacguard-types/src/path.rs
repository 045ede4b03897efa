use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a template or finding lives, relative to the root passed to `scan_fs`.
///
/// Results name files by this path, and the same file always gets the same spelling on every
/// platform: backslashes become `/`, any leading `./` is dropped, and the scan root itself is `.`.
/// Paths that Rego policies report back through `filepath` go through the same normalization.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SourcePath(String);

impl Default for SourcePath {
    fn default() -> Self {
        SourcePath::new(".")
    }
}

impl SourcePath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of `segment` below this one. Joining onto the scan root yields `segment` alone.
    pub fn join(&self, segment: &str) -> SourcePath {
        if self.0 == "." {
            return SourcePath::new(segment);
        }
        let base = Utf8Path::new(self.as_str());
        SourcePath::new(base.join(segment).as_str())
    }
}

impl std::fmt::Display for SourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for SourcePath {
    fn from(value: &Utf8Path) -> Self {
        SourcePath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for SourcePath {
    fn from(value: Utf8PathBuf) -> Self {
        SourcePath::new(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_leading_dot() {
        assert_eq!(SourcePath::new(".\\templates\\main.json").as_str(), "templates/main.json");
        assert_eq!(SourcePath::new("././a.json").as_str(), "a.json");
        assert_eq!(SourcePath::new("").as_str(), ".");
    }

    #[test]
    fn display_and_serde_use_the_normalized_form() {
        let path = SourcePath::new("./nested\\azuredeploy.json");
        assert_eq!(path.to_string(), "nested/azuredeploy.json");
        assert_eq!(
            serde_json::to_string(&path).expect("serialize"),
            "\"nested/azuredeploy.json\""
        );
    }

    #[test]
    fn join_from_root_drops_dot() {
        assert_eq!(SourcePath::default().join("a.json").as_str(), "a.json");
        assert_eq!(SourcePath::new("deploy").join("a.json").as_str(), "deploy/a.json");
    }
}
