mod builder;
mod find;
mod lookup;
mod node;

pub use builder::{Configure, GroupMut, RouteMut};
pub(crate) use node::{Children, CompiledRoute, Node, NodeKind};
pub use node::NodeConfig;

use crate::errors::{RouterError, RouterResult};
use crate::pattern::{CompileContext, PatternError, compile_with};
use crate::types::RouteId;
use regex::Regex;
use std::sync::Arc;

pub(crate) const ROOT: RouteId = RouteId(0);
pub(crate) const CHILD_CAPTURE: &str = "child";

/// Arena of route nodes. Index 0 is the root; every other node points at its
/// parent, which is fixed at creation.
#[derive(Debug)]
pub(crate) struct RouteTree {
    nodes: Vec<Node>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(
                String::new(),
                None,
                None,
                NodeKind::Root(Children::default()),
            )],
        }
    }

    pub(crate) fn get(&self, id: RouteId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: RouteId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: RouteId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = RouteId> + '_ {
        (0..self.nodes.len()).map(RouteId)
    }

    /// Appends a node under `parent`, which must be the root or a group.
    pub(crate) fn push(
        &mut self,
        parent: RouteId,
        schema: &str,
        name: Option<&str>,
        kind: NodeKind,
    ) -> RouterResult<RouteId> {
        if let Some(name) = name {
            self.ensure_unique_name(parent, name, &kind)?;
        }

        let id = RouteId(self.nodes.len());
        let bucket = match &kind {
            NodeKind::Route { .. } => Bucket::Route,
            NodeKind::Hidden => Bucket::Hidden,
            NodeKind::Group { .. } | NodeKind::Root(_) => Bucket::Group,
        };

        debug_assert!(self.node(parent).children().is_some());
        if let Some(children) = self.node_mut(parent).children_mut() {
            match bucket {
                Bucket::Route => children.routes.push(id),
                Bucket::Hidden => children.hidden.push(id),
                Bucket::Group => children.groups.push(id),
            }
        }

        self.nodes.push(Node::new(
            schema.to_string(),
            Some(parent),
            name.map(str::to_string),
            kind,
        ));
        tracing::trace!(id = id.0, parent = parent.0, schema, "route node registered");
        Ok(id)
    }

    fn ensure_unique_name(&self, parent: RouteId, name: &str, kind: &NodeKind) -> RouterResult<()> {
        let Some(children) = self.node(parent).children() else {
            return Ok(());
        };
        let clash = match kind {
            NodeKind::Route { method, .. } => children.routes.iter().any(|&id| {
                let sibling = self.node(id);
                sibling.method() == *method && sibling.name.as_deref() == Some(name)
            }),
            NodeKind::Hidden => children
                .hidden
                .iter()
                .any(|&id| self.node(id).name.as_deref() == Some(name)),
            _ => false,
        };
        if clash {
            return Err(RouterError::DuplicateRouteName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Compiled form of a node's schema, built on first use and kept for the
    /// lifetime of the node. A configuration error is memoized as well.
    pub(crate) fn compiled(
        &self,
        id: RouteId,
        default_pattern: &str,
    ) -> Result<Arc<CompiledRoute>, PatternError> {
        let node = self.node(id);
        node.compiled
            .get_or_init(|| self.compile_node(id, node, default_pattern).map(Arc::new))
            .clone()
    }

    fn compile_node(
        &self,
        id: RouteId,
        node: &Node,
        default_pattern: &str,
    ) -> Result<CompiledRoute, PatternError> {
        let overrides = |name: &str| self.param_override(id, name);
        let ctx = CompileContext {
            default_pattern,
            overrides: &overrides,
        };
        let schema = compile_with(&node.schema, &ctx)?;

        if !node.is_matchable() {
            return Ok(CompiledRoute::new(schema, None));
        }

        let source = if node.is_group() {
            format!("^{}(?P<{CHILD_CAPTURE}>.*)$", schema.regex_fragment())
        } else {
            format!("^{}$", schema.regex_fragment())
        };
        let matcher = Regex::new(&source).map_err(|err| PatternError::RegexConstraintInvalid {
            schema: node.schema.clone(),
            name: String::new(),
            error: err.to_string(),
        })?;
        Ok(CompiledRoute::new(schema, Some(matcher)))
    }
}

enum Bucket {
    Route,
    Hidden,
    Group,
}
