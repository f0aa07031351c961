use super::{generate_segment, is_blank, route_path, value_text};
use crate::errors::{RouterError, RouterResult};
use crate::pattern::{CompileContext, compile_with};
use crate::router::RouterOptions;
use crate::tree::RouteTree;
use crate::types::{Params, RouteId};
use serde_json::Value;
use ::url::form_urlencoded::Serializer;

/// Full url for a route: host (when one applies), path, and the params no
/// schema consumed as a query string.
#[tracing::instrument(level = "trace", skip(tree, params, options))]
pub(crate) fn build_url(
    tree: &RouteTree,
    id: RouteId,
    params: Params,
    options: &RouterOptions,
    absolute: bool,
) -> RouterResult<String> {
    let mut params = params;
    params.retain(|_, value| !is_blank(value));

    let mut path = route_path(tree, id, &options.param_pattern_default, &mut params)?;
    if path.is_empty() {
        path.push('/');
    }

    let host = match tree.host(id) {
        Some(host) => Some(host),
        None if absolute => match options.default_host.as_deref() {
            Some(host) => Some(host),
            None => {
                return Err(RouterError::MissingHost {
                    name: tree.node(id).name.clone().unwrap_or_default(),
                });
            }
        },
        None => None,
    };

    if let Some(host_schema) = host {
        let host = host_text(tree, id, host_schema, options, &mut params)?;
        path = format!("{}{path}", with_scheme(&host, options.secure));
    }

    if options.append_query && !params.is_empty() {
        path.push('?');
        path.push_str(&query_string(&params)?);
    }

    Ok(path)
}

fn host_text(
    tree: &RouteTree,
    id: RouteId,
    host_schema: &str,
    options: &RouterOptions,
    params: &mut Params,
) -> RouterResult<String> {
    let overrides = |name: &str| tree.param_override(id, name);
    let ctx = CompileContext {
        default_pattern: &options.param_pattern_default,
        overrides: &overrides,
    };
    let compiled = compile_with(host_schema, &ctx)?;
    generate_segment(tree, id, host_schema, &compiled, params)
}

/// `//host` and bare hosts get a scheme; hosts that carry one are kept.
fn with_scheme(host: &str, secure: bool) -> String {
    let scheme = if secure { "https" } else { "http" };
    if has_scheme(host) {
        host.to_string()
    } else if let Some(rest) = host.strip_prefix("//") {
        format!("{scheme}://{rest}")
    } else {
        format!("{scheme}://{host}")
    }
}

fn has_scheme(host: &str) -> bool {
    let Some((scheme, _)) = host.split_once("://") else {
        return false;
    };
    scheme.starts_with(|ch: char| ch.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

/// Form-encoded query. Arrays use indexed keys (`tags[0]`), objects keyed
/// ones (`filter[name]`); nulls are left out.
fn query_string(params: &Params) -> RouterResult<String> {
    let mut query = Serializer::new(String::new());
    for (name, value) in params.iter() {
        append_pair(&mut query, name, value)?;
    }
    Ok(query.finish())
}

fn append_pair(query: &mut Serializer<'_, String>, key: &str, value: &Value) -> RouterResult<()> {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_pair(query, &format!("{key}[{index}]"), item)?;
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                append_pair(query, &format!("{key}[{field}]"), item)?;
            }
        }
        scalar => {
            query.append_pair(key, &value_text(key, scalar)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scheme_is_added_only_when_missing() {
        assert_eq!(with_scheme("example.com", false), "http://example.com");
        assert_eq!(with_scheme("//example.com", true), "https://example.com");
        assert_eq!(with_scheme("ftp://example.com", true), "ftp://example.com");
        assert_eq!(with_scheme("a.example.com/x://y", false), "http://a.example.com/x://y");
    }

    #[test]
    fn nested_values_use_bracketed_keys() {
        let params = Params::new()
            .with("q", "a b")
            .with("tags", json!(["x", "y"]))
            .with("filter", json!({ "name": "n" }));
        let query = query_string(&params).expect("query should encode");
        assert_eq!(
            query,
            "q=a+b&tags%5B0%5D=x&tags%5B1%5D=y&filter%5Bname%5D=n"
        );
    }
}
