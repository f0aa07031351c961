use super::params::{bind_params, clean_params};
use crate::enums::HttpMethod;
use crate::errors::RouterResult;
use crate::tree::{CHILD_CAPTURE, Children, ROOT, RouteTree};
use crate::types::{RouteId, RouteMatch};

/// Terminal route and full match for `path`, searching from the root.
/// A miss is `Ok(None)`; errors are configuration or binder failures.
#[tracing::instrument(level = "trace", skip(tree, default_pattern))]
pub(crate) fn find_route(
    tree: &RouteTree,
    path: &str,
    method: Option<HttpMethod>,
    default_pattern: &str,
) -> RouterResult<Option<(RouteId, RouteMatch)>> {
    let resolver = Resolver {
        tree,
        method,
        default_pattern,
    };
    resolver.match_children(ROOT, path)
}

struct Resolver<'t> {
    tree: &'t RouteTree,
    method: Option<HttpMethod>,
    default_pattern: &'t str,
}

impl Resolver<'_> {
    fn match_children(&self, parent: RouteId, path: &str) -> RouterResult<Option<(RouteId, RouteMatch)>> {
        let Some(children) = self.tree.node(parent).children() else {
            return Ok(None);
        };

        for id in self.candidates(children) {
            if let Some(matched) = self.match_route(id, path)? {
                return Ok(Some((id, matched)));
            }
        }

        for &group in &children.groups {
            if let Some(found) = self.match_group(group, path)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Wildcard bucket first, then the requested method's bucket. Without a
    /// method only wildcard routes qualify.
    fn candidates<'c>(&'c self, children: &'c Children) -> impl Iterator<Item = RouteId> + 'c {
        let any = children
            .routes
            .iter()
            .copied()
            .filter(move |&id| self.tree.node(id).method().is_none());
        let exact = children.routes.iter().copied().filter(move |&id| {
            self.method
                .is_some_and(|method| self.tree.node(id).method() == Some(method))
        });
        any.chain(exact)
    }

    fn match_route(&self, id: RouteId, path: &str) -> RouterResult<Option<RouteMatch>> {
        let compiled = self.tree.compiled(id, self.default_pattern)?;
        let Some(captures) = compiled.matcher().and_then(|regex| regex.captures(path)) else {
            return Ok(None);
        };
        let Some(clean) = clean_params(compiled.schema(), &captures) else {
            return Ok(None);
        };
        let params = bind_params(self.tree, id, &clean)?;
        Ok(Some(RouteMatch::new(path, params, clean)))
    }

    /// Matches the group's own schema as a prefix, hands the remainder to its
    /// children, and folds the group's params under the child's.
    fn match_group(&self, id: RouteId, path: &str) -> RouterResult<Option<(RouteId, RouteMatch)>> {
        let compiled = self.tree.compiled(id, self.default_pattern)?;
        let Some(captures) = compiled.matcher().and_then(|regex| regex.captures(path)) else {
            return Ok(None);
        };
        let rest = captures.name(CHILD_CAPTURE).map_or("", |m| m.as_str());

        let Some((route, child)) = self.match_children(id, rest)? else {
            return Ok(None);
        };
        let Some(clean) = clean_params(compiled.schema(), &captures) else {
            return Ok(None);
        };
        let params = bind_params(self.tree, id, &clean)?;
        Ok(Some((route, child.nest_under(path, params, clean))))
    }
}
