use super::{Children, NodeConfig, NodeKind, RouteTree};
use crate::dispatch::{Action, Controller};
use crate::enums::HttpMethod;
use crate::errors::{ActionError, RouterResult};
use crate::types::RouteId;
use serde_json::Value;
use std::sync::Arc;

/// Settings shared by every node kind. Each setter affects the node it is
/// called on and, through the ancestor lookups, everything below it.
pub trait Configure {
    #[doc(hidden)]
    fn config_mut(&mut self) -> &mut NodeConfig;

    fn bind<I, O>(&mut self, name: &str, input: I, output: O) -> &mut Self
    where
        Self: Sized,
        I: Fn(Value) -> Result<Value, ActionError> + Send + Sync + 'static,
        O: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        let binders = &mut self.config_mut().binders;
        binders.bind_in(name, input);
        binders.bind_out(name, output);
        self
    }

    fn bind_in<F>(&mut self, name: &str, input: F) -> &mut Self
    where
        Self: Sized,
        F: Fn(Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.config_mut().binders.bind_in(name, input);
        self
    }

    fn bind_out<F>(&mut self, name: &str, output: F) -> &mut Self
    where
        Self: Sized,
        F: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.config_mut().binders.bind_out(name, output);
        self
    }

    /// Host schema prefixed to generated urls; may contain parameters.
    fn set_host(&mut self, host: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.config_mut().host = Some(host.into());
        self
    }

    fn set_error_action(&mut self, action: impl Into<Action>) -> &mut Self
    where
        Self: Sized,
    {
        self.config_mut().error_action = Some(action.into());
        self
    }

    fn set_dispatcher<F>(&mut self, hook: F) -> &mut Self
    where
        Self: Sized,
        F: Fn(&str) -> Result<Action, ActionError> + Send + Sync + 'static,
    {
        self.config_mut().dispatcher = Some(Arc::new(hook));
        self
    }

    fn set_controller_factory<F>(&mut self, factory: F) -> &mut Self
    where
        Self: Sized,
        F: Fn(&str) -> Option<Arc<dyn Controller>> + Send + Sync + 'static,
    {
        self.config_mut().controller_factory = Some(Arc::new(factory));
        self
    }

    /// Validation pattern for params of this name that declare none.
    fn pattern(&mut self, name: impl Into<String>, regex: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.config_mut().patterns.insert(name.into(), regex.into());
        self
    }

    fn param_type(&mut self, name: impl Into<String>, type_name: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.config_mut().types.insert(name.into(), type_name.into());
        self
    }
}

pub struct GroupMut<'t> {
    tree: &'t mut RouteTree,
    id: RouteId,
}

impl<'t> GroupMut<'t> {
    pub(crate) fn new(tree: &'t mut RouteTree, id: RouteId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn any(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, None)
    }

    pub fn get(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Get))
    }

    pub fn head(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Head))
    }

    pub fn post(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Post))
    }

    pub fn put(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Put))
    }

    pub fn delete(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Delete))
    }

    pub fn connect(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Connect))
    }

    pub fn options(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Options))
    }

    pub fn trace(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Trace))
    }

    pub fn patch(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
    ) -> RouterResult<RouteMut<'_>> {
        self.request(schema, action, name, Some(HttpMethod::Patch))
    }

    /// Registers a terminal route. `method: None` places it in the wildcard
    /// bucket, which every dispatch consults first.
    pub fn request(
        &mut self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
        method: Option<HttpMethod>,
    ) -> RouterResult<RouteMut<'_>> {
        let kind = NodeKind::Route {
            method,
            action: action.into(),
        };
        let id = self.tree.push(self.id, schema, name, kind)?;
        Ok(RouteMut {
            tree: &mut *self.tree,
            id,
        })
    }

    /// Name-only route used for url generation; never dispatched.
    pub fn hidden(&mut self, schema: &str, name: &str) -> RouterResult<RouteMut<'_>> {
        let id = self.tree.push(self.id, schema, Some(name), NodeKind::Hidden)?;
        Ok(RouteMut {
            tree: &mut *self.tree,
            id,
        })
    }

    /// Registers a group and runs `build` against it. `prefix` is stripped
    /// from names during lookup by name (`"api."` lets `"api.users"` reach a
    /// child named `"users"`).
    pub fn group<F>(&mut self, schema: &str, prefix: Option<&str>, build: F) -> RouterResult<RouteId>
    where
        F: FnOnce(&mut GroupMut<'_>) -> RouterResult<()>,
    {
        let kind = NodeKind::Group {
            prefix: prefix.map(str::to_string),
            children: Children::default(),
        };
        let id = self.tree.push(self.id, schema, None, kind)?;
        let mut group = GroupMut::new(&mut *self.tree, id);
        build(&mut group)?;
        Ok(id)
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.config_mut().namespace = Some(namespace.into());
        self
    }
}

impl Configure for GroupMut<'_> {
    fn config_mut(&mut self) -> &mut NodeConfig {
        &mut self.tree.node_mut(self.id).config
    }
}

pub struct RouteMut<'t> {
    tree: &'t mut RouteTree,
    id: RouteId,
}

impl RouteMut<'_> {
    pub fn id(&self) -> RouteId {
        self.id
    }
}

impl Configure for RouteMut<'_> {
    fn config_mut(&mut self) -> &mut NodeConfig {
        &mut self.tree.node_mut(self.id).config
    }
}
