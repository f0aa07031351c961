use super::action::{Action, ActionContext, Controller, ControllerRegistry, HandlerFn};
use crate::errors::{RouterError, RouterResult};
use crate::tree::RouteTree;
use crate::types::{RouteId, RouteMatch};
use memchr::memchr;
use serde_json::Value;
use std::sync::Arc;

const CONTROLLER_SEPARATOR: u8 = b'@';

/// Runs actions for matched routes: resolve, invoke, and on failure hand
/// over to the nearest error action.
pub(crate) struct Invoker<'t> {
    tree: &'t RouteTree,
    controllers: &'t ControllerRegistry,
    namespace_separator: &'t str,
}

enum Resolved {
    Handler(Arc<HandlerFn>),
    Method {
        controller: Arc<dyn Controller>,
        action: String,
    },
}

impl<'t> Invoker<'t> {
    pub(crate) fn new(
        tree: &'t RouteTree,
        controllers: &'t ControllerRegistry,
        namespace_separator: &'t str,
    ) -> Self {
        Self {
            tree,
            controllers,
            namespace_separator,
        }
    }

    #[tracing::instrument(level = "trace", skip(self, matched), fields(path = matched.path()))]
    pub(crate) fn execute(&self, route: RouteId, matched: &RouteMatch) -> RouterResult<Value> {
        let args: Vec<Value> = matched.params().values().cloned().collect();
        let ctx = ActionContext::new(route, matched, &args, None);

        let outcome = match self.tree.node(route).action() {
            Some(action) => self.run(route, action, &ctx),
            None => Err(RouterError::ActionNotInvocable {
                route: self.label(route),
            }),
        };

        let failure = match outcome {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        match self.tree.error_action(route) {
            Some(error_action) => {
                tracing::debug!(error = %failure, "action failed; running error action");
                let ctx = ActionContext::new(route, matched, &args, Some(&failure));
                self.run(route, error_action, &ctx)
            }
            None => {
                tracing::warn!(error = %failure, "action failed with no error action on the chain");
                Err(failure)
            }
        }
    }

    fn run(&self, route: RouteId, action: &Action, ctx: &ActionContext<'_>) -> RouterResult<Value> {
        let failed = |source| RouterError::ActionFailed {
            route: self.label(route),
            source,
        };
        match self.resolve(route, action)? {
            Resolved::Handler(handler) => handler(ctx).map_err(failed),
            Resolved::Method { controller, action } => controller.call(&action, ctx).map_err(failed),
        }
    }

    /// Identifier to something callable: the nearest dispatcher hook first,
    /// then `Controller@action` lookup with the namespace-qualified name.
    fn resolve(&self, route: RouteId, action: &Action) -> RouterResult<Resolved> {
        let translated;
        let action = match (self.tree.dispatcher(route), action) {
            (Some(hook), Action::Identifier(identifier)) => {
                translated = hook(identifier.as_str()).map_err(|source| RouterError::ActionFailed {
                    route: self.label(route),
                    source,
                })?;
                &translated
            }
            _ => action,
        };

        let identifier = match action {
            Action::Handler(handler) => return Ok(Resolved::Handler(Arc::clone(handler))),
            Action::Identifier(identifier) => identifier,
        };

        let Some(at) = memchr(CONTROLLER_SEPARATOR, identifier.as_bytes()) else {
            return Err(RouterError::ActionNotInvocable {
                route: self.label(route),
            });
        };
        let (controller_name, action_name) = (&identifier[..at], &identifier[at + 1..]);

        let qualified = match self.tree.namespace(route, self.namespace_separator) {
            Some(namespace) => format!("{namespace}{}{controller_name}", self.namespace_separator),
            None => controller_name.to_string(),
        };

        let controller = match self.tree.controller_factory(route) {
            Some(factory) => factory(qualified.as_str()),
            None => self.controllers.construct(&qualified),
        };
        let Some(controller) = controller else {
            return Err(RouterError::ControllerNotFound {
                controller: qualified,
            });
        };

        if !controller.has_action(action_name) {
            return Err(RouterError::ActionNotFound {
                controller: qualified,
                action: action_name.to_string(),
            });
        }

        Ok(Resolved::Method {
            controller,
            action: action_name.to_string(),
        })
    }

    fn label(&self, route: RouteId) -> String {
        let node = self.tree.node(route);
        node.name.clone().unwrap_or_else(|| node.schema.clone())
    }
}
