mod options;
mod service;

pub use options::{
    DEFAULT_NAMESPACE_SEPARATOR, RouterOptions, RouterOptionsBuilder, RouterOptionsError,
};
pub use service::Router;
