use super::{Node, RouteTree};
use crate::binder::{BindInFn, BindOutFn};
use crate::dispatch::{Action, ControllerFactory, DispatcherHook};
use crate::pattern::ParamOverride;
use crate::types::RouteId;
use std::sync::Arc;

/// Walks from a node up to the root, the node itself first.
pub(crate) struct Ancestors<'t> {
    tree: &'t RouteTree,
    next: Option<RouteId>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = (RouteId, &'t Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.tree.node(id);
        self.next = node.parent;
        Some((id, node))
    }
}

impl RouteTree {
    pub(crate) fn ancestors(&self, id: RouteId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    fn first_defined<'t, T>(
        &'t self,
        id: RouteId,
        mut pick: impl FnMut(&'t Node) -> Option<T>,
    ) -> Option<T> {
        self.ancestors(id).find_map(|(_, node)| pick(node))
    }

    pub(crate) fn host(&self, id: RouteId) -> Option<&str> {
        self.first_defined(id, |node| node.config.host.as_deref())
    }

    pub(crate) fn error_action(&self, id: RouteId) -> Option<&Action> {
        self.first_defined(id, |node| node.config.error_action.as_ref())
    }

    pub(crate) fn dispatcher(&self, id: RouteId) -> Option<&DispatcherHook> {
        self.first_defined(id, |node| node.config.dispatcher.as_ref())
    }

    pub(crate) fn controller_factory(&self, id: RouteId) -> Option<&ControllerFactory> {
        self.first_defined(id, |node| node.config.controller_factory.as_ref())
    }

    pub(crate) fn binder_in(&self, id: RouteId, name: &str) -> Option<&Arc<BindInFn>> {
        self.first_defined(id, |node| node.config.binders.input(name))
    }

    pub(crate) fn binder_out(&self, id: RouteId, name: &str) -> Option<&Arc<BindOutFn>> {
        self.first_defined(id, |node| node.config.binders.output(name))
    }

    /// Pattern and type are looked up independently, so a group may supply the
    /// type while a route narrows the pattern.
    pub(crate) fn param_override(&self, id: RouteId, name: &str) -> ParamOverride {
        ParamOverride {
            pattern: self
                .first_defined(id, |node| node.config.patterns.get(name))
                .cloned(),
            type_name: self
                .first_defined(id, |node| node.config.types.get(name))
                .cloned(),
        }
    }

    /// Namespaces set on the chain, joined from the root down.
    pub(crate) fn namespace(&self, id: RouteId, separator: &str) -> Option<String> {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .filter_map(|(_, node)| node.config.namespace.as_deref())
            .filter(|segment| !segment.is_empty())
            .collect();
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(segments.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Children, NodeKind, ROOT};
    use super::*;

    fn group(tree: &mut RouteTree, parent: RouteId, schema: &str) -> RouteId {
        tree.push(
            parent,
            schema,
            None,
            NodeKind::Group {
                prefix: None,
                children: Children::default(),
            },
        )
        .expect("group registers")
    }

    #[test]
    fn nearest_definition_wins() {
        let mut tree = RouteTree::new();
        let outer = group(&mut tree, ROOT, "/a");
        let inner = group(&mut tree, outer, "/b");
        tree.node_mut(ROOT).config.host = Some("root.test".to_string());
        tree.node_mut(outer).config.host = Some("outer.test".to_string());

        assert_eq!(tree.host(inner), Some("outer.test"));
        assert_eq!(tree.host(ROOT), Some("root.test"));
        assert!(tree.error_action(inner).is_none());
    }

    #[test]
    fn pattern_and_type_resolve_separately() {
        let mut tree = RouteTree::new();
        let outer = group(&mut tree, ROOT, "/a");
        tree.node_mut(ROOT)
            .config
            .types
            .insert("id".to_string(), "int".to_string());
        tree.node_mut(outer)
            .config
            .patterns
            .insert("id".to_string(), "[1-9][0-9]*".to_string());

        let found = tree.param_override(outer, "id");
        assert_eq!(found.pattern.as_deref(), Some("[1-9][0-9]*"));
        assert_eq!(found.type_name.as_deref(), Some("int"));
        assert_eq!(tree.param_override(outer, "other"), ParamOverride::default());
    }

    #[test]
    fn namespaces_join_from_root() {
        let mut tree = RouteTree::new();
        let outer = group(&mut tree, ROOT, "/a");
        let middle = group(&mut tree, outer, "/b");
        let inner = group(&mut tree, middle, "/c");
        tree.node_mut(ROOT).config.namespace = Some("App".to_string());
        tree.node_mut(inner).config.namespace = Some("Admin".to_string());

        assert_eq!(tree.namespace(inner, "."), Some("App.Admin".to_string()));
        assert_eq!(tree.namespace(middle, "::"), Some("App".to_string()));
    }
}
