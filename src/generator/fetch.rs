use super::{is_blank, value_text};
use crate::errors::{RouterError, RouterResult};
use crate::pattern::{CompiledSchema, ParamSpec, SchemaElement};
use crate::tree::RouteTree;
use crate::types::{Params, RouteId};

/// Path of a node: its own fragment, prefixed by the fragments of the groups
/// it is nested in. Every param a fragment declares is taken out of `params`.
pub(crate) fn route_path(
    tree: &RouteTree,
    id: RouteId,
    default_pattern: &str,
    params: &mut Params,
) -> RouterResult<String> {
    let node = tree.node(id);
    let compiled = tree.compiled(id, default_pattern)?;
    let own = generate_segment(tree, id, &node.schema, compiled.schema(), params)?;

    match node.parent {
        Some(parent) if tree.node(parent).is_group() => {
            let mut path = route_path(tree, parent, default_pattern, params)?;
            path.push_str(&own);
            Ok(path)
        }
        _ => Ok(own),
    }
}

/// Fills one schema. Tokens are visited right to left so an optional value
/// equal to its default is left out unless something to its right was
/// already written. Output binders are looked up from `node`.
#[tracing::instrument(level = "trace", skip_all, fields(schema = %schema))]
pub(crate) fn generate_segment(
    tree: &RouteTree,
    node: RouteId,
    schema: &str,
    compiled: &CompiledSchema,
    params: &mut Params,
) -> RouterResult<String> {
    params.retain(|_, value| !is_blank(value));
    let generation = Generation {
        tree,
        node,
        schema,
        compiled,
    };
    let text = generation.sequence(compiled.elements(), params, true)?;
    Ok(text.unwrap_or_default())
}

enum Emit {
    Text(String),
    Skip,
    Fail,
}

struct Generation<'a> {
    tree: &'a RouteTree,
    node: RouteId,
    schema: &'a str,
    compiled: &'a CompiledSchema,
}

impl<'a> Generation<'a> {
    /// `None` when a param of a non-required sequence had no value; the
    /// caller drops the whole sequence.
    fn sequence(
        &self,
        elements: &'a [SchemaElement],
        params: &mut Params,
        required: bool,
    ) -> RouterResult<Option<String>> {
        let specs = self.compiled.params();
        let mut parts: Vec<String> = Vec::with_capacity(elements.len());
        let mut used: Vec<&'a str> = Vec::new();
        let mut failed = false;

        for element in elements.iter().rev() {
            match element {
                SchemaElement::Literal(text) => {
                    if !text.is_empty() {
                        parts.push(text.clone());
                    }
                }
                SchemaElement::Param { index, optional } => {
                    let spec = &specs[*index];
                    used.push(&spec.name);
                    if failed {
                        continue;
                    }
                    match self.param(spec, *optional, params, required, !parts.is_empty())? {
                        Emit::Text(text) => parts.push(text),
                        Emit::Skip => {}
                        Emit::Fail => failed = true,
                    }
                }
                SchemaElement::Segment(inner) => {
                    if let Some(text) = self.sequence(inner, params, false)?
                        && !text.is_empty()
                    {
                        parts.push(text);
                    }
                }
            }
        }

        for name in used {
            params.remove(name);
        }

        if failed {
            return Ok(None);
        }
        parts.reverse();
        Ok(Some(parts.concat()))
    }

    fn param(
        &self,
        spec: &ParamSpec,
        optional: bool,
        params: &Params,
        required: bool,
        emitted_after: bool,
    ) -> RouterResult<Emit> {
        let text = self.resolve(spec, params)?;

        if text.is_empty() {
            if optional {
                return Ok(Emit::Skip);
            }
            if required {
                return Err(RouterError::MissingRequiredParameter {
                    name: spec.name.clone(),
                    route: self.schema.to_string(),
                });
            }
            return Ok(Emit::Fail);
        }

        if let Some(kind) = spec.kind
            && !kind.accepts(&text)
        {
            return Err(RouterError::ParamValidationFailed {
                name: spec.name.clone(),
                value: text,
                expected: kind.to_string(),
            });
        }
        if let Some(validator) = &spec.validator
            && !validator.is_match(&text)
        {
            return Err(RouterError::ParamValidationFailed {
                name: spec.name.clone(),
                value: text,
                expected: validator.source().to_string(),
            });
        }

        if !optional || emitted_after || spec.default.as_deref() != Some(text.as_str()) {
            Ok(Emit::Text(text))
        } else {
            Ok(Emit::Skip)
        }
    }

    /// Supplied value (through the output binder), else the output binder
    /// fed with every remaining param, else the default.
    fn resolve(&self, spec: &ParamSpec, params: &Params) -> RouterResult<String> {
        let output = self.tree.binder_out(self.node, &spec.name);
        let binder_failed = |source| RouterError::BinderFailed {
            name: spec.name.clone(),
            source,
        };

        if let Some(value) = params.get(&spec.name) {
            return match output {
                Some(output) => value_text(&spec.name, &output(value).map_err(binder_failed)?),
                None => value_text(&spec.name, value),
            };
        }

        if let Some(output) = output {
            let produced = output(&params.to_object()).map_err(binder_failed)?;
            if !is_blank(&produced) {
                return value_text(&spec.name, &produced);
            }
        }

        Ok(spec.default.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use crate::tree::ROOT;
    use serde_json::json;

    fn generate(schema: &str, params: &mut Params) -> RouterResult<String> {
        let tree = RouteTree::new();
        let compiled = compile(schema).expect("schema should compile");
        generate_segment(&tree, ROOT, schema, &compiled, params)
    }

    fn path(schema: &str, params: Params) -> String {
        let mut params = params;
        generate(schema, &mut params).expect("generation should succeed")
    }

    #[test]
    fn optional_segment_follows_its_last_param() {
        let schema = "/api[/v{v}?/{vv}]";
        assert_eq!(path(schema, Params::new()), "/api");
        assert_eq!(path(schema, Params::new().with("v", 2)), "/api");
        assert_eq!(path(schema, Params::new().with("vv", 1)), "/api/v/1");
        assert_eq!(
            path(schema, Params::new().with("v", 2).with("vv", 1)),
            "/api/v2/1"
        );
    }

    #[test]
    fn required_param_uses_default_and_validator() {
        let schema = "/user/{id:1|[0-9]+}";
        assert_eq!(path(schema, Params::new()), "/user/1");
        assert_eq!(path(schema, Params::new().with("id", 2)), "/user/2");

        let mut params = Params::new().with("id", "test");
        let err = generate(schema, &mut params).expect_err("validator should reject");
        assert!(matches!(
            err,
            RouterError::ParamValidationFailed { ref name, ref expected, .. }
                if name == "id" && expected == "[0-9]+?"
        ));
    }

    #[test]
    fn missing_required_param_names_the_schema() {
        let mut params = Params::new();
        let err = generate("/user/{id}", &mut params).expect_err("id is required");
        match err {
            RouterError::MissingRequiredParameter { name, route } => {
                assert_eq!(name, "id");
                assert_eq!(route, "/user/{id}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn trailing_optional_default_is_suppressed() {
        assert_eq!(path("/list/{page:1}?", Params::new()), "/list/");
        assert_eq!(path("/list/{page:1}?", Params::new().with("page", 1)), "/list/");
        assert_eq!(path("/list/{page:1}?", Params::new().with("page", 3)), "/list/3");
    }

    #[test]
    fn typed_values_are_checked_before_emission() {
        assert_eq!(path("/{id#int}", Params::new().with("id", -1)), "/-1");
        assert_eq!(path("/{on#bool}", Params::new().with("on", true)), "/1");

        let mut params = Params::new().with("id", -1);
        assert!(matches!(
            generate("/{id#uint}", &mut params),
            Err(RouterError::ParamValidationFailed { ref expected, .. }) if expected == "uint"
        ));
    }

    #[test]
    fn consumed_params_are_removed_and_blank_ones_dropped() {
        let mut params = Params::new()
            .with("id", 5)
            .with("foo", "bar")
            .with("empty", "")
            .with("none", json!(null));
        let text = generate("/user/{id}", &mut params).expect("generation should succeed");
        assert_eq!(text, "/user/5");
        let left: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(left, vec!["foo"]);
    }

    #[test]
    fn failed_segment_still_consumes_its_params() {
        let mut params = Params::new().with("v", 2);
        let text = generate("/api[/v{v}?/{vv}]", &mut params).expect("generation should succeed");
        assert_eq!(text, "/api");
        assert!(params.is_empty());
    }
}
