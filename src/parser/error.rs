use crate::lexer::{Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("expected next token to be {expected}, got {actual} instead")]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("no prefix parse function for {0} found")]
    NoPrefixRule(TokenKind),
    #[error("could not parse {0:?} as integer")]
    InvalidInteger(CompactString),
    #[error("could not parse {0:?} as float")]
    InvalidFloat(CompactString),
    #[error("invalid assignment target: {0}")]
    InvalidAssignmentTarget(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "P001",
            ParserErrorKind::NoPrefixRule(_) => "P002",
            ParserErrorKind::InvalidInteger(_) => "P003",
            ParserErrorKind::InvalidFloat(_) => "P004",
            ParserErrorKind::InvalidAssignmentTarget(_) => "P005",
        }
    }
}
