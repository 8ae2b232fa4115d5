use crate::lexer::{Span, Token};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: IdentName,
    pub span: Span,
}

impl Ident {
    pub fn new(name: &str, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl From<&Token> for Ident {
    fn from(token: &Token) -> Self {
        Self::new(&token.literal, token.span)
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub type IdentName = Rc<str>;
