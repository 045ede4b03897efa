//! ARM deployment to canonical state.
//!
//! Unknown resource types are ignored. Attributes that are missing or hold an expression that
//! cannot be resolved take the platform default and are marked as not explicit.

mod appservice;
mod keyvault;
mod network;
mod storage;

use crate::parse::{ArmDeployment, Resource};
use crate::spans::Node;
use iacguard_scan::StateAdapter;
use iacguard_state::{BoolValue, IntValue, Metadata, State, StringValue, Value};
use iacguard_types::{Range, ScanContext};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default)]
pub struct ArmAdapter;

impl StateAdapter<ArmDeployment> for ArmAdapter {
    fn adapt(&self, ctx: &ScanContext, deployment: &ArmDeployment) -> State {
        let mut state = State::default();
        if ctx.is_done() {
            return state;
        }
        let resources = flatten(deployment);
        state.azure.storage = storage::adapt(deployment, &resources);
        state.azure.key_vault = keyvault::adapt(deployment, &resources);
        state.azure.network = network::adapt(deployment, &resources);
        state.azure.app_service = appservice::adapt(deployment, &resources);
        trace!(
            path = %deployment.path,
            resources = resources.len(),
            empty = state.is_empty(),
            "adapted deployment"
        );
        state
    }
}

/// A resource with its fully qualified type and, for child resources, the name of the
/// top-level resource it belongs to.
pub(crate) struct Located<'d> {
    pub kind: String,
    pub resource: &'d Resource,
    pub name: String,
    pub parent: Option<String>,
}

impl Located<'_> {
    pub fn is(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    /// Last segment of a `parent/child` resource name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn belongs_to(&self, parent: &str) -> bool {
        self.parent
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(parent))
    }
}

/// Every resource in document order, nested children after their parent.
pub(crate) fn flatten(deployment: &ArmDeployment) -> Vec<Located<'_>> {
    let mut out = Vec::new();
    for resource in &deployment.resources {
        let name = deployment.display_name(&resource.name);
        let parent = name
            .contains('/')
            .then(|| name.split('/').next().unwrap_or_default().to_string());
        push_tree(deployment, resource, resource.kind.clone(), name, parent, &mut out);
    }
    out
}

fn push_tree<'d>(
    deployment: &'d ArmDeployment,
    resource: &'d Resource,
    kind: String,
    name: String,
    parent: Option<String>,
    out: &mut Vec<Located<'d>>,
) {
    let root = parent.clone().unwrap_or_else(|| name.clone());
    out.push(Located {
        kind: kind.clone(),
        resource,
        name,
        parent,
    });
    for child in &resource.children {
        let child_kind = if child.kind.contains('.') {
            child.kind.clone()
        } else {
            format!("{kind}/{}", child.kind)
        };
        let child_name = deployment.display_name(&child.name);
        push_tree(
            deployment,
            child,
            child_kind,
            child_name,
            Some(root.clone()),
            out,
        );
    }
}

/// Typed attribute reads relative to one resource's `properties`.
pub(crate) struct Props<'d> {
    deployment: &'d ArmDeployment,
    node: Option<&'d Node>,
    fallback: Range,
}

impl<'d> Props<'d> {
    pub fn of(deployment: &'d ArmDeployment, resource: &'d Resource) -> Self {
        Self {
            deployment,
            node: resource.properties.as_ref(),
            fallback: deployment.resource_range(resource),
        }
    }

    /// Reads relative to `node`; missing attributes point at `node` itself.
    pub fn at(deployment: &'d ArmDeployment, node: &'d Node) -> Self {
        Self {
            deployment,
            node: Some(node),
            fallback: deployment.range_of(node),
        }
    }

    pub fn node(&self, path: &[&str]) -> Option<&'d Node> {
        self.node.and_then(|n| n.get_path(path))
    }

    /// Metadata for the attribute at `path`, or for the enclosing object when it is absent.
    pub fn metadata(&self, path: &[&str]) -> Metadata {
        match self.node(path) {
            Some(attr) => Metadata::new(self.deployment.range_of(attr)),
            None => Metadata::defaulted(self.fallback.clone()),
        }
    }

    pub fn own_metadata(&self) -> Metadata {
        Metadata::new(self.fallback.clone())
    }

    fn read<T>(&self, path: &[&str], default: T, convert: impl Fn(&Node) -> Option<T>) -> Value<T> {
        let Some(attr) = self.node(path) else {
            return Value::new(default, Metadata::defaulted(self.fallback.clone()));
        };
        let range = self.deployment.range_of(attr);
        match self.deployment.resolve(attr).and_then(convert) {
            Some(v) => Value::new(v, Metadata::new(range)),
            None => Value::new(default, Metadata::defaulted(range)),
        }
    }

    pub fn bool(&self, path: &[&str], default: bool) -> BoolValue {
        self.read(path, default, Node::as_bool)
    }

    pub fn int(&self, path: &[&str], default: i64) -> IntValue {
        self.read(path, default, Node::as_i64)
    }

    pub fn string(&self, path: &[&str], default: &str) -> StringValue {
        self.read(path, default.to_string(), |n| n.as_str().map(str::to_string))
    }

    /// A scalar or an array of scalars, each resolved on its own.
    pub fn strings(&self, path: &[&str]) -> Vec<StringValue> {
        let Some(attr) = self.node(path) else {
            return Vec::new();
        };
        let target = self.deployment.resolve(attr).unwrap_or(attr);
        let items: Vec<&Node> = match target.items() {
            [] if target.as_scalar().is_some() => vec![target],
            items => items.iter().collect(),
        };
        items
            .into_iter()
            .filter_map(|item| {
                let value = self.deployment.resolve(item)?.as_str()?.to_string();
                Some(Value::new(value, Metadata::new(self.deployment.range_of(item))))
            })
            .collect()
    }
}
