use crate::errors::{ActionError, RouterError};
use crate::types::{RouteId, RouteMatch};
use hashbrown::HashMap as FastHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type HandlerFn = dyn Fn(&ActionContext<'_>) -> Result<Value, ActionError> + Send + Sync;

/// Translates an action identifier into an action before it is resolved.
pub type DispatcherHook = Arc<dyn Fn(&str) -> Result<Action, ActionError> + Send + Sync>;

/// Builds the controller instance for a namespace-qualified name.
pub type ControllerFactory = Arc<dyn Fn(&str) -> Option<Arc<dyn Controller>> + Send + Sync>;

type ControllerConstructor = Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

/// What a route runs when it matches.
#[derive(Clone)]
pub enum Action {
    Handler(Arc<HandlerFn>),
    /// Opaque reference such as `"Users@show"`, resolved at dispatch time.
    Identifier(String),
}

impl Action {
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        Action::Handler(Arc::new(handler))
    }

    pub fn identifier(identifier: impl Into<String>) -> Self {
        Action::Identifier(identifier.into())
    }
}

impl From<&str> for Action {
    fn from(identifier: &str) -> Self {
        Action::Identifier(identifier.to_string())
    }
}

impl From<String> for Action {
    fn from(identifier: String) -> Self {
        Action::Identifier(identifier)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Handler(_) => f.write_str("Action::Handler(..)"),
            Action::Identifier(identifier) => {
                f.debug_tuple("Action::Identifier").field(identifier).finish()
            }
        }
    }
}

/// Operations of a controller, looked up by name at dispatch time.
pub trait Controller: Send + Sync {
    fn has_action(&self, action: &str) -> bool;

    fn call(&self, action: &str, ctx: &ActionContext<'_>) -> Result<Value, ActionError>;
}

/// Default constructors for controllers, keyed by qualified name.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    constructors: FastHashMap<String, ControllerConstructor>,
}

impl ControllerRegistry {
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Controller> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn construct(&self, name: &str) -> Option<Arc<dyn Controller>> {
        self.constructors.get(name).map(|constructor| constructor())
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

/// Everything an action sees: the match, its bound values in declaration
/// order, and for error actions the failure being handled.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    route: RouteId,
    matched: &'a RouteMatch,
    args: &'a [Value],
    failure: Option<&'a RouterError>,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        route: RouteId,
        matched: &'a RouteMatch,
        args: &'a [Value],
        failure: Option<&'a RouterError>,
    ) -> Self {
        Self {
            route,
            matched,
            args,
            failure,
        }
    }

    pub fn route(&self) -> RouteId {
        self.route
    }

    pub fn matched(&self) -> &'a RouteMatch {
        self.matched
    }

    pub fn path(&self) -> &'a str {
        self.matched.path()
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.matched.param(name)
    }

    pub fn failure(&self) -> Option<&'a RouterError> {
        self.failure
    }
}
