use crate::spans::{self, Node};
use anyhow::Context;
use iacguard_scan::Deployment;
use iacguard_types::{Range, SourcePath};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Substring of `$schema` that marks a deployment template (as opposed to a parameters file).
pub const DEPLOYMENT_SCHEMA_MARKER: &str = "deploymenttemplate.json";

/// Template expressions nest at most this deep when resolving `parameters()`/`variables()`.
const MAX_RESOLVE_DEPTH: usize = 8;

/// One parsed ARM template file.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmDeployment {
    pub path: SourcePath,
    pub range: Range,
    /// Parameter default values, keyed by lowercase name.
    pub parameters: BTreeMap<String, Node>,
    /// Variables, keyed by lowercase name.
    pub variables: BTreeMap<String, Node>,
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    /// The `type` as written; nested children may use a short form.
    pub kind: String,
    pub name: Node,
    pub properties: Option<Node>,
    pub start_line: u32,
    pub end_line: u32,
    pub children: Vec<Resource>,
}

impl Deployment for ArmDeployment {
    fn source_path(&self) -> &SourcePath {
        &self.path
    }

    fn range(&self) -> &Range {
        &self.range
    }
}

impl ArmDeployment {
    pub fn range_of(&self, node: &Node) -> Range {
        Range::new(self.path.clone(), node.start_line, node.end_line)
    }

    pub fn resource_range(&self, resource: &Resource) -> Range {
        Range::new(self.path.clone(), resource.start_line, resource.end_line)
    }

    /// Follow `[parameters('x')]` and `[variables('x')]` to the literal they name.
    ///
    /// Returns `None` for any other template expression or a reference that does not resolve.
    pub fn resolve<'a>(&'a self, node: &'a Node) -> Option<&'a Node> {
        let mut current = node;
        for _ in 0..MAX_RESOLVE_DEPTH {
            let Some(text) = current.as_str() else {
                return Some(current);
            };
            let Some(expr) = expression(text) else {
                return Some(current);
            };
            current = match reference(expr)? {
                ("parameters", name) => self.parameters.get(&name)?,
                ("variables", name) => self.variables.get(&name)?,
                _ => return None,
            };
        }
        None
    }

    /// Resolved string, or the raw text when it is an unresolvable expression.
    pub fn display_name(&self, node: &Node) -> String {
        self.resolve(node)
            .and_then(Node::as_str)
            .or_else(|| node.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// The body of a `[...]` expression; `[[` escapes a literal bracket.
fn expression(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with("[[") {
        return None;
    }
    trimmed.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split `fn('name')` into `("fn", "name")` with the name lowercased.
fn reference(expr: &str) -> Option<(&str, String)> {
    let (func, rest) = expr.split_once('(')?;
    let arg = rest.strip_suffix(')')?.trim();
    let arg = arg.strip_prefix('\'')?.strip_suffix('\'')?;
    if arg.contains('\'') {
        return None;
    }
    Some((func.trim(), arg.to_ascii_lowercase()))
}

/// Parse one template file.
///
/// Invalid JSON is an error. Valid JSON that is not a deployment template is `Ok(None)`.
pub fn parse_template(path: &SourcePath, text: &str) -> anyhow::Result<Option<ArmDeployment>> {
    let value: JsonValue =
        serde_json::from_str(text).with_context(|| format!("parse {path}"))?;
    let is_template = value
        .get("$schema")
        .and_then(JsonValue::as_str)
        .map(|s| s.to_ascii_lowercase().contains(DEPLOYMENT_SCHEMA_MARKER))
        .unwrap_or(false);
    if !is_template {
        return Ok(None);
    }

    let root = spans::parse(text).with_context(|| format!("locate values in {path}"))?;

    let parameters = root
        .get("parameters")
        .map(|p| p.members())
        .unwrap_or_default()
        .iter()
        .filter_map(|(name, decl)| {
            decl.get("defaultValue")
                .map(|v| (name.to_ascii_lowercase(), v.clone()))
        })
        .collect();
    let variables = root
        .get("variables")
        .map(|v| v.members())
        .unwrap_or_default()
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();
    let resources = root
        .get("resources")
        .map(|r| r.items())
        .unwrap_or_default()
        .iter()
        .filter_map(resource)
        .collect();

    Ok(Some(ArmDeployment {
        path: path.clone(),
        range: Range::new(path.clone(), root.start_line, root.end_line),
        parameters,
        variables,
        resources,
    }))
}

fn resource(node: &Node) -> Option<Resource> {
    let kind = node.get("type")?.as_str()?.to_string();
    let name = node.get("name")?.clone();
    let children = node
        .get("resources")
        .map(|r| r.items())
        .unwrap_or_default()
        .iter()
        .filter_map(resource)
        .collect();
    Some(Resource {
        kind,
        name,
        properties: node.get("properties").cloned(),
        start_line: node.start_line,
        end_line: node.end_line,
        children,
    })
}
