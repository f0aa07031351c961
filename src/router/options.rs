use crate::pattern::DEFAULT_PARAM_PATTERN;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NAMESPACE_SEPARATOR: &str = ".";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouterOptions {
    /// Pattern of params that declare neither a type nor a validator.
    pub param_pattern_default: String,
    /// Host for `url_absolute` when no node on the route's chain sets one.
    pub default_host: Option<String>,
    pub secure: bool,
    pub append_query: bool,
    pub namespace_separator: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            param_pattern_default: DEFAULT_PARAM_PATTERN.to_string(),
            default_host: None,
            secure: false,
            append_query: true,
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RouterOptionsError> {
        if self.param_pattern_default.is_empty() {
            return Err(RouterOptionsError::EmptyParamPattern);
        }
        if let Err(err) = Regex::new(&format!("^(?:{})$", self.param_pattern_default)) {
            return Err(RouterOptionsError::ParamPatternInvalid {
                pattern: self.param_pattern_default.clone(),
                error: err.to_string(),
            });
        }
        if self
            .default_host
            .as_ref()
            .is_some_and(|host| host.trim().is_empty())
        {
            return Err(RouterOptionsError::EmptyDefaultHost);
        }
        if self.namespace_separator.is_empty() {
            return Err(RouterOptionsError::EmptyNamespaceSeparator);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouterOptionsBuilder {
    options: RouterOptions,
}

impl RouterOptionsBuilder {
    pub fn param_pattern_default<S: Into<String>>(mut self, pattern: S) -> Self {
        self.options.param_pattern_default = pattern.into();
        self
    }

    pub fn default_host<S: Into<String>>(mut self, host: S) -> Self {
        self.options.default_host = Some(host.into());
        self
    }

    pub fn secure(mut self, value: bool) -> Self {
        self.options.secure = value;
        self
    }

    pub fn append_query(mut self, value: bool) -> Self {
        self.options.append_query = value;
        self
    }

    pub fn namespace_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.options.namespace_separator = separator.into();
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterOptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterOptionsError {
    #[error("param_pattern_default must not be empty")]
    EmptyParamPattern,
    #[error("param_pattern_default '{pattern}' is not a valid regex: {error}")]
    ParamPatternInvalid { pattern: String, error: String },
    #[error("default_host must not be blank")]
    EmptyDefaultHost,
    #[error("namespace_separator must not be empty")]
    EmptyNamespaceSeparator,
}
