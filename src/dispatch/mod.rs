mod action;
mod invoke;

pub use action::{
    Action, ActionContext, Controller, ControllerFactory, ControllerRegistry, DispatcherHook,
    HandlerFn,
};
pub(crate) use invoke::Invoker;
