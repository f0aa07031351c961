use hashbrown::HashSet as FastHashSet;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use super::ast::{ParameterNode, SchemaAst, SchemaNode};
use super::parser::parse_schema;
use super::regex_tools::validator_pattern;
use super::{PatternError, PatternResult};

pub const DEFAULT_PARAM_PATTERN: &str = "[^/]+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParamType {
    Int,
    UInt,
    Bool,
}

impl ParamType {
    pub fn parse(type_name: &str) -> Option<Self> {
        match type_name {
            "int" => Some(ParamType::Int),
            "uint" => Some(ParamType::UInt),
            "bool" | "boolean" => Some(ParamType::Bool),
            _ => None,
        }
    }

    pub fn builtin_pattern(&self) -> &'static str {
        match self {
            ParamType::Int => "-?[0-9]+",
            ParamType::UInt => "[0-9]+",
            ParamType::Bool => "0|1",
        }
    }

    /// Raw captured text to typed value. `None` when the text does not fit the
    /// type (possible only with a custom validator or an out-of-range number).
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            ParamType::Int => raw.parse::<i64>().ok().map(Value::from),
            ParamType::UInt => raw
                .parse::<i64>()
                .ok()
                .map(|n| Value::from(n.max(0) as u64))
                .or_else(|| raw.parse::<u64>().ok().map(Value::from)),
            ParamType::Bool => match raw {
                "1" | "true" => Some(Value::Bool(true)),
                "0" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }

    /// Whether an outgoing value is the canonical text form of this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ParamType::Int => value.parse::<i64>().is_ok_and(|n| n.to_string() == value),
            ParamType::UInt => value.parse::<u64>().is_ok_and(|n| n.to_string() == value),
            ParamType::Bool => value == "0" || value == "1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::UInt => "uint",
            ParamType::Bool => "bool",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved validator: the fragment embedded in the schema regex plus its
/// fully anchored form used to check outgoing values.
#[derive(Debug, Clone)]
pub struct ParamValidator {
    source: String,
    anchored: Regex,
}

impl ParamValidator {
    fn new(source: String, schema: &str, name: &str) -> PatternResult<Self> {
        let anchored = Regex::new(&format!("^(?:{source})$")).map_err(|err| {
            PatternError::RegexConstraintInvalid {
                schema: schema.to_string(),
                name: name.to_string(),
                error: err.to_string(),
            }
        })?;
        Ok(Self { source, anchored })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl PartialEq for ParamValidator {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub default: Option<String>,
    pub kind: Option<ParamType>,
    pub validator: Option<ParamValidator>,
    pattern: String,
}

impl ParamSpec {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaElement {
    Literal(String),
    Param { index: usize, optional: bool },
    Segment(Vec<SchemaElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    regex_fragment: String,
    params: Vec<ParamSpec>,
    elements: Vec<SchemaElement>,
}

impl CompiledSchema {
    /// Unanchored; callers add `^`/`$` or a trailing child capture.
    pub fn regex_fragment(&self) -> &str {
        &self.regex_fragment
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn elements(&self) -> &[SchemaElement] {
        &self.elements
    }
}

pub fn capture_name(index: usize) -> String {
    format!("p{index}")
}

/// Pattern and type registered for a param name on the route tree; used when
/// the schema token itself declares neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverride {
    pub pattern: Option<String>,
    pub type_name: Option<String>,
}

pub struct CompileContext<'a> {
    pub default_pattern: &'a str,
    pub overrides: &'a dyn Fn(&str) -> ParamOverride,
}

fn no_overrides(_: &str) -> ParamOverride {
    ParamOverride::default()
}

impl Default for CompileContext<'_> {
    fn default() -> Self {
        Self {
            default_pattern: DEFAULT_PARAM_PATTERN,
            overrides: &no_overrides,
        }
    }
}

pub fn compile(schema: &str) -> PatternResult<CompiledSchema> {
    compile_with(schema, &CompileContext::default())
}

#[tracing::instrument(level = "trace", skip_all, fields(schema = %schema))]
pub fn compile_with(schema: &str, ctx: &CompileContext<'_>) -> PatternResult<CompiledSchema> {
    let ast = parse_schema(schema)?;
    compile_ast(&ast, schema, ctx)
}

pub fn compile_ast(
    ast: &SchemaAst,
    schema: &str,
    ctx: &CompileContext<'_>,
) -> PatternResult<CompiledSchema> {
    let mut compiler = SchemaCompiler {
        schema,
        ctx,
        params: Vec::new(),
        seen: FastHashSet::new(),
    };
    let (regex_fragment, elements) = compiler.compile_sequence(&ast.nodes)?;
    Ok(CompiledSchema {
        regex_fragment,
        params: compiler.params,
        elements,
    })
}

struct SchemaCompiler<'s, 'c> {
    schema: &'s str,
    ctx: &'c CompileContext<'c>,
    params: Vec<ParamSpec>,
    seen: FastHashSet<String>,
}

impl SchemaCompiler<'_, '_> {
    fn compile_sequence(
        &mut self,
        nodes: &[SchemaNode],
    ) -> PatternResult<(String, Vec<SchemaElement>)> {
        let mut fragment = String::new();
        let mut elements = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                SchemaNode::Literal(text) => {
                    fragment.push_str(&regex::escape(text));
                    elements.push(SchemaElement::Literal(text.clone()));
                }
                SchemaNode::Parameter(param) => {
                    let index = self.params.len();
                    let spec = self.resolve_param(param)?;
                    fragment.push_str(&format!("(?P<{}>{})", capture_name(index), spec.pattern));
                    if param.optional {
                        fragment.push('?');
                    }
                    self.params.push(spec);
                    elements.push(SchemaElement::Param {
                        index,
                        optional: param.optional,
                    });
                }
                SchemaNode::Segment(inner) => {
                    let (inner_fragment, inner_elements) = self.compile_sequence(inner)?;
                    fragment.push_str(&format!("(?:{inner_fragment})?"));
                    elements.push(SchemaElement::Segment(inner_elements));
                }
            }
        }

        Ok((fragment, elements))
    }

    fn resolve_param(&mut self, param: &ParameterNode) -> PatternResult<ParamSpec> {
        if !self.seen.insert(param.name.clone()) {
            return Err(PatternError::DuplicateParameter {
                schema: self.schema.to_string(),
                name: param.name.clone(),
            });
        }

        let fallback = if param.type_name.is_none() || param.validator.is_none() {
            (self.ctx.overrides)(&param.name)
        } else {
            ParamOverride::default()
        };

        let kind = match param.type_name.as_ref().or(fallback.type_name.as_ref()) {
            Some(type_name) => Some(ParamType::parse(type_name).ok_or_else(|| {
                PatternError::UnknownParamType {
                    schema: self.schema.to_string(),
                    name: param.name.clone(),
                    type_name: type_name.clone(),
                }
            })?),
            None => None,
        };

        let source = param
            .validator
            .as_deref()
            .or(fallback.pattern.as_deref())
            .map(validator_pattern)
            .or_else(|| kind.map(|k| k.builtin_pattern().to_string()));

        let validator = source
            .map(|source| ParamValidator::new(source, self.schema, &param.name))
            .transpose()?;

        let pattern = validator
            .as_ref()
            .map(|v| v.source().to_string())
            .unwrap_or_else(|| self.ctx.default_pattern.to_string());

        Ok(ParamSpec {
            name: param.name.clone(),
            default: param.default.clone(),
            kind,
            validator,
            pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_literals_params_and_segments() {
        let compiled = compile("/api[/v{v}?/{vv}]").expect("schema should compile");
        assert_eq!(
            compiled.regex_fragment(),
            r"/api(?:/v(?P<p0>[^/]+)?/(?P<p1>[^/]+))?"
        );
        let names: Vec<&str> = compiled.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["v", "vv"]);
    }

    #[test]
    fn typed_params_use_builtin_patterns() {
        let compiled = compile("/{a#int}/{b#uint}/{c#boolean}").expect("schema should compile");
        let patterns: Vec<&str> = compiled.params().iter().map(|p| p.pattern()).collect();
        assert_eq!(patterns, vec!["-?[0-9]+", "[0-9]+", "0|1"]);
        assert_eq!(compiled.params()[2].kind, Some(ParamType::Bool));
    }

    #[test]
    fn literal_text_is_regex_escaped() {
        let compiled = compile("/file.json").expect("schema should compile");
        assert_eq!(compiled.regex_fragment(), r"/file\.json");
    }

    #[test]
    fn overrides_apply_only_to_undeclared_parts() {
        let overrides = |name: &str| match name {
            "id" => ParamOverride {
                pattern: Some("[a-f0-9]+".to_string()),
                type_name: None,
            },
            _ => ParamOverride::default(),
        };
        let ctx = CompileContext {
            default_pattern: DEFAULT_PARAM_PATTERN,
            overrides: &overrides,
        };
        let compiled = compile_with("/{id}/{other|x}", &ctx).expect("schema should compile");
        assert_eq!(compiled.params()[0].pattern(), "[a-f0-9]+?");
        assert_eq!(compiled.params()[1].pattern(), "x");
    }

    #[test]
    fn unknown_type_is_a_configuration_error() {
        let err = compile("/{id#undefined}").expect_err("unknown type should fail");
        assert!(matches!(
            err,
            PatternError::UnknownParamType { ref type_name, .. } if type_name == "undefined"
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = compile("/{id}[/{id}]").expect_err("duplicate should fail");
        assert!(matches!(err, PatternError::DuplicateParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn invalid_validator_is_rejected() {
        let err = compile("/{id|[}").expect_err("invalid regex should fail");
        assert!(matches!(err, PatternError::RegexConstraintInvalid { .. }));
    }

    #[test]
    fn coercion_follows_type() {
        assert_eq!(ParamType::Int.coerce("-3"), Some(Value::from(-3)));
        assert_eq!(ParamType::UInt.coerce("-3"), Some(Value::from(0u64)));
        assert_eq!(ParamType::Bool.coerce("0"), Some(Value::Bool(false)));
        assert_eq!(ParamType::Bool.coerce("2"), None);
        assert!(ParamType::Int.accepts("-1"));
        assert!(!ParamType::Int.accepts("007"));
        assert!(!ParamType::UInt.accepts("-1"));
    }
}
