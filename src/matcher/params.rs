use crate::errors::{RouterError, RouterResult};
use crate::pattern::{CompiledSchema, capture_name};
use crate::tree::RouteTree;
use crate::types::{Params, RouteId};
use regex::Captures;
use serde_json::Value;

/// Captured text to clean params: an empty or absent capture takes the
/// default (or null), then the declared type coerces it. `None` when a value
/// does not fit its type, which counts as no match.
pub(crate) fn clean_params(schema: &CompiledSchema, captures: &Captures<'_>) -> Option<Params> {
    let mut params = Params::new();
    for (index, spec) in schema.params().iter().enumerate() {
        let raw = captures
            .name(&capture_name(index))
            .map(|m| m.as_str())
            .filter(|text| !text.is_empty())
            .or(spec.default.as_deref());

        let value = match (raw, spec.kind) {
            (None, _) => Value::Null,
            (Some(text), None) => Value::String(text.to_string()),
            (Some(text), Some(kind)) => match kind.coerce(text) {
                Some(value) => value,
                None => {
                    tracing::debug!(param = %spec.name, value = text, kind = %kind, "value does not coerce");
                    return None;
                }
            },
        };
        params.insert(spec.name.clone(), value);
    }
    Some(params)
}

/// Clean params to bound params through the nearest input binder of each
/// name. Null values skip the binder.
pub(crate) fn bind_params(tree: &RouteTree, id: RouteId, clean: &Params) -> RouterResult<Params> {
    let mut bound = Params::new();
    for (name, value) in clean.iter() {
        let value = match tree.binder_in(id, name) {
            Some(input) if !value.is_null() => {
                input(value.clone()).map_err(|source| RouterError::BinderFailed {
                    name: name.to_string(),
                    source,
                })?
            }
            _ => value.clone(),
        };
        bound.insert(name, value);
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use regex::Regex;
    use serde_json::json;

    fn clean(schema: &str, path: &str) -> Option<Params> {
        let compiled = compile(schema).expect("schema should compile");
        let regex = Regex::new(&format!("^{}$", compiled.regex_fragment())).expect("regex");
        let captures = regex.captures(path)?;
        clean_params(&compiled, &captures)
    }

    #[test]
    fn absent_captures_take_defaults() {
        let params = clean("/page[/{page:1#int}]/{tag}?", "/page/").expect("should match");
        assert_eq!(params.get("page"), Some(&json!(1)));
        assert_eq!(params.get("tag"), Some(&Value::Null));
    }

    #[test]
    fn coercion_failure_is_no_match() {
        assert!(clean("/{id#int|[a-z]+}", "/abc").is_none());
        let params = clean("/{flag#boolean}", "/0").expect("should match");
        assert_eq!(params.get("flag"), Some(&json!(false)));
    }
}
