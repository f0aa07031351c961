mod fetch;
mod url;

pub(crate) use fetch::{generate_segment, route_path};
pub(crate) use self::url::build_url;

use crate::errors::{RouterError, RouterResult};
use serde_json::Value;

/// Text form of a param value as it appears in a path. Booleans follow the
/// `bool` param type (`1`/`0`); null is empty.
pub(crate) fn value_text(name: &str, value: &Value) -> RouterResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(flag) => Ok(if *flag { "1" } else { "0" }.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        Value::Array(_) | Value::Object(_) => Err(RouterError::ParamValidationFailed {
            name: name.to_string(),
            value: value.to_string(),
            expected: "scalar".to_string(),
        }),
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
