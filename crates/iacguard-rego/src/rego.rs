use crate::findings::{self, PolicyMetadata};
use crate::{Input, PolicyError, PolicyInterpreter};
use camino::{Utf8Path, Utf8PathBuf};
use iacguard_types::{ScanContext, ScanResult};
use serde_json::Value as JsonValue;
use std::io;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Packages outside these top-level namespaces are loaded but never evaluated.
pub const DEFAULT_NAMESPACES: &[&str] = &["builtin", "user"];

/// Where the interpreter finds its policies.
#[derive(Clone, Debug)]
pub struct RegoOptions {
    /// Directories walked for `*.rego`. Relative entries resolve against the scanned filesystem.
    pub policy_dirs: Vec<Utf8PathBuf>,
    /// `(name, source)` pairs compiled ahead of anything on disk.
    pub embedded: Vec<(String, String)>,
    pub namespaces: Vec<String>,
}

impl Default for RegoOptions {
    fn default() -> Self {
        Self {
            policy_dirs: Vec::new(),
            embedded: Vec::new(),
            namespaces: DEFAULT_NAMESPACES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegoOptions {
    pub fn with_policy_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.policy_dirs.push(dir.into());
        self
    }

    pub fn with_embedded_policy(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.embedded.push((name.into(), source.into()));
        self
    }

    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }
}

/// Rego interpreter backed by `regorus`.
///
/// Each package in an evaluated namespace is queried for `__rego_metadata__` and `deny`.
pub struct RegoInterpreter {
    options: RegoOptions,
    template: regorus::Engine,
    /// Package paths as regorus reports them, without the `data.` prefix.
    packages: Vec<String>,
}

impl RegoInterpreter {
    pub fn new(options: RegoOptions) -> Self {
        Self {
            options,
            template: regorus::Engine::new(),
            packages: Vec::new(),
        }
    }

    /// Packages loaded so far, in load order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    fn evaluated(&self, package: &str) -> bool {
        let head = package.split('.').next().unwrap_or(package);
        self.options.namespaces.iter().any(|ns| ns == head)
    }

    fn add_source(
        engine: &mut regorus::Engine,
        packages: &mut Vec<String>,
        name: &str,
        text: String,
    ) -> Result<(), PolicyError> {
        let path = engine
            .add_policy(name.to_string(), text)
            .map_err(|e| PolicyError::Compile {
                path: name.to_string(),
                message: e.to_string(),
            })?;
        let pkg = path.strip_prefix("data.").unwrap_or(&path).to_string();
        if !packages.contains(&pkg) {
            trace!(policy = name, package = %pkg, "policy compiled");
            packages.push(pkg);
        }
        Ok(())
    }
}

impl PolicyInterpreter for RegoInterpreter {
    fn load_policies(&mut self, policy_fs: &Utf8Path) -> Result<(), PolicyError> {
        let mut engine = regorus::Engine::new();
        let mut packages = Vec::new();

        for (name, text) in &self.options.embedded {
            Self::add_source(&mut engine, &mut packages, name, text.clone())?;
        }

        for dir in &self.options.policy_dirs {
            let root = if dir.is_absolute() {
                dir.clone()
            } else {
                policy_fs.join(dir)
            };
            for path in policy_files(&root)? {
                let text = std::fs::read_to_string(&path).map_err(|source| PolicyError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::add_source(&mut engine, &mut packages, path.as_str(), text)?;
            }
        }

        debug!(packages = packages.len(), "rego bundle compiled");
        self.packages = packages;
        self.template = engine;
        Ok(())
    }

    fn evaluate(&self, ctx: &ScanContext, input: &Input<'_>) -> Result<Vec<ScanResult>, PolicyError> {
        let input_json = serde_json::to_string(input.contents)?;
        let mut engine = self.template.clone();
        engine
            .set_input_json(&input_json)
            .map_err(|e| PolicyError::Evaluate {
                query: "input".to_string(),
                message: e.to_string(),
            })?;

        let mut out = Vec::new();
        for package in self.packages.iter().filter(|p| self.evaluated(p)) {
            ctx.check()?;
            let raw_meta = query(&mut engine, &rule_ref(package, "__rego_metadata__"))?;
            let metadata = PolicyMetadata::from_json(package, raw_meta.first());
            let denials = query(&mut engine, &rule_ref(package, "deny"))?
                .into_iter()
                .next();
            out.extend(findings::from_denials(package, &metadata, denials, input.path));
        }
        Ok(out)
    }
}

/// Values of the first expression of each result row. Undefined queries yield nothing.
fn query(engine: &mut regorus::Engine, query: &str) -> Result<Vec<JsonValue>, PolicyError> {
    let eval_err = |message: String| PolicyError::Evaluate {
        query: query.to_string(),
        message,
    };
    let results = engine
        .eval_query(query.to_string(), false)
        .map_err(|e| eval_err(e.to_string()))?;
    let raw = serde_json::to_value(&results).map_err(|e| eval_err(e.to_string()))?;

    let rows = raw
        .get("result")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(rows
        .iter()
        .filter_map(|row| {
            row.get("expressions")?
                .as_array()?
                .first()?
                .get("value")
                .cloned()
        })
        .collect())
}

fn policy_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, PolicyError> {
    let read_err = |source: io::Error| PolicyError::Read {
        path: root.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(root).map_err(read_err)?;
    if !meta.is_dir() {
        return Err(read_err(io::Error::new(
            io::ErrorKind::NotADirectory,
            "policy path is not a directory",
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| read_err(io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if path.extension() == Some("rego") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// `data` reference to `rule` inside `package`. Segments that are not plain identifiers are
/// written as string indexes so packages like `user["open-ssh"]` stay queryable.
fn rule_ref(package: &str, rule: &str) -> String {
    let mut out = String::from("data");
    for segment in package.split('.').chain(std::iter::once(rule)) {
        let plain = segment
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            out.push('.');
            out.push_str(segment);
        } else {
            out.push('[');
            out.push_str(&JsonValue::from(segment).to_string());
            out.push(']');
        }
    }
    out
}
