pub mod ast;
mod compiled;
mod error;
mod parser;
mod regex_tools;

pub use ast::{ParameterNode, SchemaAst, SchemaNode};
pub use compiled::{
    CompileContext, CompiledSchema, DEFAULT_PARAM_PATTERN, ParamOverride, ParamSpec, ParamType,
    ParamValidator, SchemaElement, capture_name, compile, compile_ast, compile_with,
};
pub use error::{PatternError, PatternResult};
pub use parser::parse_schema;
pub use regex_tools::{disable_groups, validator_pattern};
