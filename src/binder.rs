use crate::errors::ActionError;
use hashbrown::HashMap as FastHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type BindInFn = dyn Fn(Value) -> Result<Value, ActionError> + Send + Sync;
pub type BindOutFn = dyn Fn(&Value) -> Result<Value, ActionError> + Send + Sync;

/// Transforms for one parameter name. Either half may be registered alone.
#[derive(Clone, Default)]
pub struct Binder {
    input: Option<Arc<BindInFn>>,
    output: Option<Arc<BindOutFn>>,
}

impl Binder {
    pub fn input(&self) -> Option<&Arc<BindInFn>> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Arc<BindOutFn>> {
        self.output.as_ref()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("input", &self.input.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BinderTable {
    binders: FastHashMap<String, Binder>,
}

impl BinderTable {
    pub fn bind_in<F>(&mut self, name: impl Into<String>, input: F)
    where
        F: Fn(Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.binders.entry(name.into()).or_default().input = Some(Arc::new(input));
    }

    pub fn bind_out<F>(&mut self, name: impl Into<String>, output: F)
    where
        F: Fn(&Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.binders.entry(name.into()).or_default().output = Some(Arc::new(output));
    }

    pub fn input(&self, name: &str) -> Option<&Arc<BindInFn>> {
        self.binders.get(name).and_then(Binder::input)
    }

    pub fn output(&self, name: &str) -> Option<&Arc<BindOutFn>> {
        self.binders.get(name).and_then(Binder::output)
    }
}
