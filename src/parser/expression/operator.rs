use crate::lexer::TokenKind;

/// Binding strength of an infix position, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    // x = y
    Assign,
    // == !=
    Equals,
    // < >
    LessGreater,
    // + -
    Sum,
    // * /
    Product,
    // !x -x
    Prefix,
    // f(x)
    Call,
    // a[i]
    Index,
    // obj.prop
    Dot,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Equal => Self::Assign,
            TokenKind::EqualEqual | TokenKind::BangEqual => Self::Equals,
            TokenKind::LessThan | TokenKind::GreaterThan => Self::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Self::Sum,
            TokenKind::Star | TokenKind::Slash => Self::Product,
            TokenKind::LeftParenthesis => Self::Call,
            TokenKind::LeftBracket => Self::Index,
            TokenKind::Dot => Self::Dot,
            _ => Self::Lowest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(Self::Bang),
            TokenKind::Minus => Some(Self::Minus),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bang => write!(f, "!"),
            Self::Minus => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    LessThan,
    GreaterThan,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Star => Some(Self::Multiply),
            TokenKind::Slash => Some(Self::Divide),
            TokenKind::LessThan => Some(Self::LessThan),
            TokenKind::GreaterThan => Some(Self::GreaterThan),
            TokenKind::EqualEqual => Some(Self::EqualEqual),
            TokenKind::BangEqual => Some(Self::BangEqual),
            _ => None,
        }
    }
}

impl std::fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::LessThan => write!(f, "<"),
            Self::GreaterThan => write!(f, ">"),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
        }
    }
}
