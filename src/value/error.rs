use crate::lexer::Span;
use crate::parser::expression::{InfixOperator, PrefixOperator};
use crate::string::IdentName;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("identifier not found: {0}")]
    UndefinedIdentifier(IdentName),
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    #[error("unknown operator: {lhs} {operator} {rhs}")]
    UnknownInfixOperator {
        lhs: &'static str,
        operator: InfixOperator,
        rhs: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("not a class: {0}")]
    NotAClass(&'static str),
    #[error("not an instance: {0}")]
    NotAnInstance(&'static str),
    #[error("property not found: {0}")]
    UndefinedProperty(IdentName),
    #[error("wrong number of arguments. got={actual}, want={expected}")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("argument to `{name}` not supported, got {actual}")]
    UnsupportedArgument {
        name: &'static str,
        actual: &'static str,
    },
    #[error("argument to `{name}` must be ARRAY, got {actual}")]
    NonArrayArgument {
        name: &'static str,
        actual: &'static str,
    },
    #[error("index operator not supported: {0}")]
    UnsupportedIndex(&'static str),
    #[error("unusable as hash key: {0}")]
    UnhashableKey(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    #[source]
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedIdentifier(_) => "RT001",
            RuntimeErrorKind::UnknownPrefixOperator { .. } => "RT002",
            RuntimeErrorKind::UnknownInfixOperator { .. } => "RT003",
            RuntimeErrorKind::DivisionByZero => "RT004",
            RuntimeErrorKind::NotAFunction(_) => "RT005",
            RuntimeErrorKind::NotAClass(_) => "RT006",
            RuntimeErrorKind::NotAnInstance(_) => "RT007",
            RuntimeErrorKind::UndefinedProperty(_) => "RT008",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT009",
            RuntimeErrorKind::UnsupportedArgument { .. } => "RT010",
            RuntimeErrorKind::NonArrayArgument { .. } => "RT011",
            RuntimeErrorKind::UnsupportedIndex(_) => "RT012",
            RuntimeErrorKind::UnhashableKey(_) => "RT013",
        }
    }
}
