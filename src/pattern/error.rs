use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("schema '{schema}' has an unterminated parameter starting at byte {start}")]
    UnterminatedParameter { schema: String, start: usize },
    #[error("schema '{schema}' has an unterminated optional segment starting at byte {start}")]
    UnterminatedSegment { schema: String, start: usize },
    #[error("schema '{schema}' has an unexpected '{found}' at byte {index}")]
    UnexpectedClosing {
        schema: String,
        index: usize,
        found: char,
    },
    #[error("parameter in schema '{schema}' is missing a name")]
    ParameterMissingName { schema: String },
    #[error("schema '{schema}' ends with a lone escape character at byte {index}")]
    LoneEscapeCharacter { schema: String, index: usize },
    #[error("parameter '{name}' is declared more than once in schema '{schema}'")]
    DuplicateParameter { schema: String, name: String },
    #[error("unknown type '{type_name}' for parameter '{name}' in schema '{schema}'")]
    UnknownParamType {
        schema: String,
        name: String,
        type_name: String,
    },
    #[error("invalid pattern for parameter '{name}' in schema '{schema}': {error}")]
    RegexConstraintInvalid {
        schema: String,
        name: String,
        error: String,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;
