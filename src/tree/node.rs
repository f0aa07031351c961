use crate::binder::BinderTable;
use crate::dispatch::{Action, ControllerFactory, DispatcherHook};
use crate::enums::HttpMethod;
use crate::pattern::{CompiledSchema, PatternError};
use crate::types::RouteId;
use hashbrown::HashMap as FastHashMap;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Settings a node may carry locally. Reads go through the ancestor lookups
/// in `lookup.rs`, nearest definition first.
#[derive(Clone, Default)]
pub struct NodeConfig {
    pub(crate) host: Option<String>,
    pub(crate) error_action: Option<Action>,
    pub(crate) dispatcher: Option<DispatcherHook>,
    pub(crate) controller_factory: Option<ControllerFactory>,
    pub(crate) namespace: Option<String>,
    pub(crate) binders: BinderTable,
    pub(crate) patterns: FastHashMap<String, String>,
    pub(crate) types: FastHashMap<String, String>,
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("host", &self.host)
            .field("error_action", &self.error_action)
            .field("dispatcher", &self.dispatcher.is_some())
            .field("controller_factory", &self.controller_factory.is_some())
            .field("namespace", &self.namespace)
            .field("binders", &self.binders)
            .field("patterns", &self.patterns)
            .field("types", &self.types)
            .finish()
    }
}

/// Child ids in registration order. Method buckets are not stored separately;
/// callers filter `routes` by the route's method.
#[derive(Debug, Clone, Default)]
pub(crate) struct Children {
    pub(crate) routes: Vec<RouteId>,
    pub(crate) hidden: Vec<RouteId>,
    pub(crate) groups: Vec<RouteId>,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Root(Children),
    Group {
        prefix: Option<String>,
        children: Children,
    },
    Route {
        /// `None` is the wildcard bucket filled by `any`.
        method: Option<HttpMethod>,
        action: Action,
    },
    Hidden,
}

#[derive(Debug)]
pub(crate) struct CompiledRoute {
    schema: CompiledSchema,
    matcher: Option<Regex>,
}

impl CompiledRoute {
    pub(crate) fn new(schema: CompiledSchema, matcher: Option<Regex>) -> Self {
        Self { schema, matcher }
    }

    pub(crate) fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub(crate) fn matcher(&self) -> Option<&Regex> {
        self.matcher.as_ref()
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) schema: String,
    pub(crate) parent: Option<RouteId>,
    pub(crate) name: Option<String>,
    pub(crate) config: NodeConfig,
    pub(crate) kind: NodeKind,
    pub(crate) compiled: OnceLock<Result<Arc<CompiledRoute>, PatternError>>,
}

impl Node {
    pub(crate) fn new(
        schema: String,
        parent: Option<RouteId>,
        name: Option<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            schema,
            parent,
            name,
            config: NodeConfig::default(),
            kind,
            compiled: OnceLock::new(),
        }
    }

    pub(crate) fn children(&self) -> Option<&Children> {
        match &self.kind {
            NodeKind::Root(children) | NodeKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match &mut self.kind {
            NodeKind::Root(children) | NodeKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn method(&self) -> Option<HttpMethod> {
        match &self.kind {
            NodeKind::Route { method, .. } => *method,
            _ => None,
        }
    }

    pub(crate) fn action(&self) -> Option<&Action> {
        match &self.kind {
            NodeKind::Route { action, .. } => Some(action),
            _ => None,
        }
    }

    pub(crate) fn prefix(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Group { prefix, .. } => prefix.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub(crate) fn is_matchable(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. } | NodeKind::Route { .. })
    }
}
