use crate::enums::HttpMethod;
use crate::pattern::PatternError;
use thiserror::Error;

pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no route matched {} '{path}'", method_label(.method))]
    RouteNotFound {
        method: Option<HttpMethod>,
        path: String,
    },
    #[error("route '{name}' not found")]
    RouteNameNotFound { name: String },
    #[error("parameter '{name}' is required in route '{route}'")]
    MissingRequiredParameter { name: String, route: String },
    #[error("parameter '{name}' value '{value}' is not '{expected}'")]
    ParamValidationFailed {
        name: String,
        value: String,
        expected: String,
    },
    #[error("action '{action}' does not exist in controller '{controller}'")]
    ActionNotFound { controller: String, action: String },
    #[error("action of route '{route}' is not invocable")]
    ActionNotInvocable { route: String },
    #[error("controller '{controller}' could not be instantiated")]
    ControllerNotFound { controller: String },
    #[error("action of route '{route}' failed: {source}")]
    ActionFailed {
        route: String,
        #[source]
        source: ActionError,
    },
    #[error("binder for parameter '{name}' failed: {source}")]
    BinderFailed {
        name: String,
        #[source]
        source: ActionError,
    },
    #[error("route name '{name}' is already registered")]
    DuplicateRouteName { name: String },
    #[error("router is sealed; cannot register {target}")]
    RegisterWhileSealed { target: String },
    #[error("route '{name}' has no host to build an absolute url")]
    MissingHost { name: String },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type RouterResult<T> = Result<T, RouterError>;

fn method_label(method: &Option<HttpMethod>) -> &'static str {
    method.map(|m| m.as_str()).unwrap_or("ANY")
}
