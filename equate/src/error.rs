use std::time::Duration;
use thiserror::Error;

/// Malformed expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was empty or whitespace only
    #[error("Parse error: empty expression")]
    Empty,

    /// Grammar rejected the input. `offset` counts characters, not bytes.
    #[error("Parse error: {message} at {line}:{col}")]
    Syntax {
        message: String,
        line: usize,
        col: usize,
        offset: usize,
    },

    #[error("Parse error: expression is {length} characters long, the limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("Parse error: expression nesting exceeds the limit of {limit}")]
    TooDeep { limit: usize },
}

/// Failure while evaluating a parsed expression to a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Evaluation error: undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("Evaluation error: division by zero")]
    DivisionByZero,

    /// Argument outside the domain of a function, e.g. `log(-1)`
    #[error("Evaluation error: {function} is undefined for {argument}")]
    Domain { function: String, argument: f64 },

    #[error("Evaluation error: result is not a finite number")]
    NonFinite,
}

/// Failure of the external semantic validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("Validator error: no answer within {0:?}")]
    Timeout(Duration),

    #[error("Validator error: {0}")]
    Transport(String),

    #[error("Validator error: malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors surfaced by the expression helpers and configuration loading.
///
/// The equivalence, escalation and grading entry points never return these:
/// they fold every failure into a verdict or a grading result.
#[derive(Debug, Error)]
pub enum EquateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
