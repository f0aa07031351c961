use super::{ROOT, RouteTree};
use crate::types::RouteId;

impl RouteTree {
    /// Resolves a route name: terminal routes of any method, then hidden
    /// routes, then groups whose prefix starts the name (with the prefix
    /// stripped before descending).
    pub(crate) fn find(&self, name: &str) -> Option<RouteId> {
        self.find_in(ROOT, name)
    }

    fn find_in(&self, group: RouteId, name: &str) -> Option<RouteId> {
        let children = self.node(group).children()?;
        let named = |id: &&RouteId| self.node(**id).name.as_deref() == Some(name);

        if let Some(&id) = children.routes.iter().find(named) {
            return Some(id);
        }
        if let Some(&id) = children.hidden.iter().find(named) {
            return Some(id);
        }

        children.groups.iter().find_map(|&id| {
            let prefix = self.node(id).prefix().unwrap_or("");
            let rest = name.strip_prefix(prefix)?;
            self.find_in(id, rest)
        })
    }
}
