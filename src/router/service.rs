use crate::dispatch::{Action, Controller, ControllerRegistry, Invoker};
use crate::enums::HttpMethod;
use crate::errors::{ActionError, RouterError, RouterResult};
use crate::generator::build_url;
use crate::matcher::find_route;
use crate::router::RouterOptions;
use crate::tree::{Configure, GroupMut, ROOT, RouteTree};
use crate::types::{Params, RouteId, RouteMatch};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
struct RouterState {
    tree: RouteTree,
    options: RouterOptions,
    controllers: ControllerRegistry,
    sealed: bool,
}

impl RouterState {
    fn new(options: RouterOptions) -> Self {
        Self {
            tree: RouteTree::new(),
            options,
            controllers: ControllerRegistry::default(),
            sealed: false,
        }
    }
}

/// Route tree behind a lock. Registration takes the write lock; dispatch and
/// url generation share the read lock, so actions may generate urls but must
/// not register routes.
#[derive(Debug)]
pub struct Router {
    inner: RwLock<RouterState>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Router {
    pub fn new(options: Option<RouterOptions>) -> Self {
        let state = RouterState::new(options.unwrap_or_default());
        Self {
            inner: RwLock::new(state),
        }
    }

    pub fn routes<F, R>(&self, build: F) -> RouterResult<R>
    where
        F: FnOnce(&mut GroupMut<'_>) -> RouterResult<R>,
    {
        self.with_root("routes".to_string(), build)
    }

    fn with_root<F, R>(&self, target: String, build: F) -> RouterResult<R>
    where
        F: FnOnce(&mut GroupMut<'_>) -> RouterResult<R>,
    {
        let mut guard = self.inner.write();
        if guard.sealed {
            return Err(RouterError::RegisterWhileSealed { target });
        }
        let mut root = GroupMut::new(&mut guard.tree, ROOT);
        build(&mut root)
    }

    fn configure<F>(&self, target: String, apply: F) -> RouterResult<()>
    where
        F: FnOnce(&mut GroupMut<'_>),
    {
        self.with_root(target, |root| {
            apply(root);
            Ok(())
        })
    }

    fn register(
        &self,
        schema: &str,
        action: Action,
        name: Option<&str>,
        method: Option<HttpMethod>,
    ) -> RouterResult<RouteId> {
        self.with_root(format!("route '{schema}'"), |root| {
            Ok(root.request(schema, action, name, method)?.id())
        })
    }

    pub fn any(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, None)
    }

    pub fn get(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Get))
    }

    pub fn head(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Head))
    }

    pub fn post(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Post))
    }

    pub fn put(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Put))
    }

    pub fn delete(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Delete))
    }

    pub fn connect(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Connect))
    }

    pub fn options(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Options))
    }

    pub fn trace(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Trace))
    }

    pub fn patch(&self, schema: &str, action: impl Into<Action>, name: Option<&str>) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, Some(HttpMethod::Patch))
    }

    pub fn request(
        &self,
        schema: &str,
        action: impl Into<Action>,
        name: Option<&str>,
        method: Option<HttpMethod>,
    ) -> RouterResult<RouteId> {
        self.register(schema, action.into(), name, method)
    }

    pub fn hidden(&self, schema: &str, name: &str) -> RouterResult<RouteId> {
        self.with_root(format!("route '{schema}'"), |root| Ok(root.hidden(schema, name)?.id()))
    }

    pub fn group<F>(&self, schema: &str, prefix: Option<&str>, build: F) -> RouterResult<RouteId>
    where
        F: FnOnce(&mut GroupMut<'_>) -> RouterResult<()>,
    {
        self.with_root(format!("group '{schema}'"), |root| root.group(schema, prefix, build))
    }

    pub fn bind<I, O>(&self, name: &str, input: I, output: O) -> RouterResult<()>
    where
        I: Fn(Value) -> Result<Value, ActionError> + Send + Sync + 'static,
        O: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.configure(format!("binder '{name}'"), |root| {
            root.bind(name, input, output);
        })
    }

    pub fn bind_in<F>(&self, name: &str, input: F) -> RouterResult<()>
    where
        F: Fn(Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.configure(format!("binder '{name}'"), |root| {
            root.bind_in(name, input);
        })
    }

    pub fn bind_out<F>(&self, name: &str, output: F) -> RouterResult<()>
    where
        F: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.configure(format!("binder '{name}'"), |root| {
            root.bind_out(name, output);
        })
    }

    pub fn set_host(&self, host: impl Into<String>) -> RouterResult<()> {
        self.configure("host".to_string(), |root| {
            root.set_host(host);
        })
    }

    pub fn set_error_action(&self, action: impl Into<Action>) -> RouterResult<()> {
        self.configure("error action".to_string(), |root| {
            root.set_error_action(action);
        })
    }

    pub fn set_dispatcher<F>(&self, hook: F) -> RouterResult<()>
    where
        F: Fn(&str) -> Result<Action, ActionError> + Send + Sync + 'static,
    {
        self.configure("dispatcher".to_string(), |root| {
            root.set_dispatcher(hook);
        })
    }

    pub fn set_controller_factory<F>(&self, factory: F) -> RouterResult<()>
    where
        F: Fn(&str) -> Option<Arc<dyn Controller>> + Send + Sync + 'static,
    {
        self.configure("controller factory".to_string(), |root| {
            root.set_controller_factory(factory);
        })
    }

    pub fn set_namespace(&self, namespace: impl Into<String>) -> RouterResult<()> {
        self.configure("namespace".to_string(), |root| {
            root.set_namespace(namespace);
        })
    }

    pub fn pattern(&self, name: impl Into<String>, regex: impl Into<String>) -> RouterResult<()> {
        let name = name.into();
        self.configure(format!("pattern '{name}'"), |root| {
            root.pattern(name, regex);
        })
    }

    pub fn param_type(&self, name: impl Into<String>, type_name: impl Into<String>) -> RouterResult<()> {
        let name = name.into();
        self.configure(format!("param type '{name}'"), |root| {
            root.param_type(name, type_name);
        })
    }

    /// Default constructor for a namespace-qualified controller name, used
    /// when no controller factory is set on the route's chain.
    pub fn controller<F>(&self, name: impl Into<String>, constructor: F) -> RouterResult<()>
    where
        F: Fn() -> Arc<dyn Controller> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut guard = self.inner.write();
        if guard.sealed {
            return Err(RouterError::RegisterWhileSealed {
                target: format!("controller '{name}'"),
            });
        }
        guard.controllers.register(name, constructor);
        Ok(())
    }

    /// Compiles every schema up front and closes registration. A schema
    /// error leaves the router open.
    pub fn seal(&self) -> RouterResult<()> {
        let mut guard = self.inner.write();
        if guard.sealed {
            return Ok(());
        }
        let state = &*guard;
        for id in state.tree.ids() {
            state
                .tree
                .compiled(id, &state.options.param_pattern_default)?;
        }
        guard.sealed = true;
        tracing::debug!("router sealed");
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.inner.read().sealed
    }

    /// Matches `path` and runs the route's action, falling back to the
    /// nearest error action when resolving or running it fails.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn dispatch(&self, path: &str, method: Option<HttpMethod>) -> RouterResult<Value> {
        let guard = self.inner.read_recursive();
        let (route, matched) = Self::lookup(&guard, path, method)?;
        let invoker = Invoker::new(
            &guard.tree,
            &guard.controllers,
            &guard.options.namespace_separator,
        );
        invoker.execute(route, &matched)
    }

    pub fn find_match(&self, path: &str, method: Option<HttpMethod>) -> RouterResult<(RouteId, RouteMatch)> {
        let guard = self.inner.read_recursive();
        Self::lookup(&guard, path, method)
    }

    fn lookup(
        state: &RouterState,
        path: &str,
        method: Option<HttpMethod>,
    ) -> RouterResult<(RouteId, RouteMatch)> {
        match find_route(&state.tree, path, method, &state.options.param_pattern_default)? {
            Some(found) => Ok(found),
            None => {
                tracing::debug!(path, ?method, "no route matched");
                Err(RouterError::RouteNotFound {
                    method,
                    path: path.to_string(),
                })
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<RouteId> {
        self.inner.read_recursive().tree.find(name)
    }

    /// Url for a named route, relative unless a host is set on its chain.
    pub fn url(&self, name: &str, params: Params) -> RouterResult<String> {
        self.build(name, params, false)
    }

    /// Like [`Router::url`], falling back to `default_host` when the chain
    /// sets no host.
    pub fn url_absolute(&self, name: &str, params: Params) -> RouterResult<String> {
        self.build(name, params, true)
    }

    fn build(&self, name: &str, params: Params, absolute: bool) -> RouterResult<String> {
        let guard = self.inner.read_recursive();
        let Some(id) = guard.tree.find(name) else {
            return Err(RouterError::RouteNameNotFound {
                name: name.to_string(),
            });
        };
        build_url(&guard.tree, id, params, &guard.options, absolute)
    }

    pub fn route_name(&self, id: RouteId) -> Option<String> {
        let guard = self.inner.read_recursive();
        guard.tree.get(id).and_then(|node| node.name.clone())
    }

    pub fn schema(&self, id: RouteId) -> Option<String> {
        let guard = self.inner.read_recursive();
        guard.tree.get(id).map(|node| node.schema.clone())
    }

    pub fn router_options(&self) -> RouterOptions {
        self.inner.read().options.clone()
    }
}
