//! Bidirectional URL router: compact route schemas compile to matchers that
//! turn request paths into typed params and turn params back into urls.

pub mod binder;
pub mod dispatch;
pub mod enums;
pub mod errors;
mod generator;
mod matcher;
pub mod pattern;
pub mod router;
pub mod tree;
pub mod types;

pub use binder::{Binder, BinderTable};
pub use dispatch::{Action, ActionContext, Controller};
pub use enums::HttpMethod;
pub use errors::{ActionError, RouterError, RouterResult};
pub use pattern::{CompiledSchema, ParamType, PatternError, compile};
pub use router::{Router, RouterOptions, RouterOptionsBuilder, RouterOptionsError};
pub use tree::{Configure, GroupMut, RouteMut};
pub use types::{Params, RouteId, RouteMatch};
