use iacguard_types::Framework;
use std::fmt;

/// Settings a scanner option may change.
pub trait ConfigurableScanner {
    fn set_frameworks(&mut self, frameworks: Vec<Framework>);
    fn set_rego_only(&mut self, rego_only: bool);
    fn set_include_deprecated_checks(&mut self, include: bool);
}

/// One configuration step, applied in order at construction. Later options overwrite earlier ones.
pub struct ScannerOption(Box<dyn Fn(&mut dyn ConfigurableScanner) + Send + Sync>);

impl ScannerOption {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&mut dyn ConfigurableScanner) + Send + Sync + 'static,
    {
        Self(Box::new(apply))
    }

    pub fn apply(&self, target: &mut dyn ConfigurableScanner) {
        (self.0)(target)
    }
}

impl fmt::Debug for ScannerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScannerOption")
    }
}

/// Restrict structural rules to those tagged with any of `frameworks`.
/// An empty selection means every framework.
pub fn with_frameworks<I>(frameworks: I) -> ScannerOption
where
    I: IntoIterator<Item = Framework>,
{
    let frameworks: Vec<Framework> = frameworks.into_iter().collect();
    ScannerOption::new(move |s| s.set_frameworks(frameworks.clone()))
}

/// Skip structural rules and evaluate policies only.
pub fn with_rego_only(rego_only: bool) -> ScannerOption {
    ScannerOption::new(move |s| s.set_rego_only(rego_only))
}

pub fn with_include_deprecated_checks(include: bool) -> ScannerOption {
    ScannerOption::new(move |s| s.set_include_deprecated_checks(include))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    pub frameworks: Vec<Framework>,
    pub rego_only: bool,
    pub include_deprecated_checks: bool,
}

impl ScannerConfig {
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ScannerOption>,
    {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }
}

impl ConfigurableScanner for ScannerConfig {
    fn set_frameworks(&mut self, frameworks: Vec<Framework>) {
        self.frameworks = frameworks;
    }

    fn set_rego_only(&mut self, rego_only: bool) {
        self.rego_only = rego_only;
    }

    fn set_include_deprecated_checks(&mut self, include: bool) {
        self.include_deprecated_checks = include;
    }
}
