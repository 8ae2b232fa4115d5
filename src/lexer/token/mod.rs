mod span;

use compact_str::CompactString;
pub use span::{SpanIndex, SpanLength};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("fn", TokenKind::KeywordFn);
    map.insert("class", TokenKind::KeywordClass);
    map.insert("prop", TokenKind::KeywordProp);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("new", TokenKind::KeywordNew);
    map.insert("var", TokenKind::KeywordVar);
    map.insert("void", TokenKind::KeywordVoid);
    map.insert("int", TokenKind::KeywordInt);
    map.insert("float", TokenKind::KeywordFloat);
    map.insert("string", TokenKind::KeywordString);
    map.insert("bool", TokenKind::KeywordBool);
    map.insert("call", TokenKind::KeywordCall);
    map.insert("print", TokenKind::KeywordPrint);
    map
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: SpanIndex,
    /// The length of the token in bytes.
    pub length: SpanLength,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.into(),
            length: end.saturating_sub(start).into(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start.into()..(self.start + self.length).into()
    }

    pub fn end(&self) -> SpanIndex {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        let length = end - start;
        Span { start, length }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Brackets
    LeftBracket,
    RightBracket,
    // Miscellaneous
    Comma,
    Dot,
    Colon,
    Semicolon,
    // Operators
    Minus,
    Plus,
    Star,
    Slash,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    GreaterThan,

    // Literals
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordFn,
    KeywordClass,
    KeywordProp,
    KeywordTrue,
    KeywordFalse,
    KeywordIf,
    KeywordElse,
    KeywordReturn,
    KeywordNew,
    KeywordVar,
    KeywordVoid,
    KeywordInt,
    KeywordFloat,
    KeywordString,
    KeywordBool,
    KeywordCall,
    KeywordPrint,

    // Unrecognized character.
    Illegal,
    // End of file.
    Eof,
}

impl TokenKind {
    /// Token kinds that may name a declared type after a `:`.
    pub fn is_type_name(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::KeywordInt
                | TokenKind::KeywordFloat
                | TokenKind::KeywordString
                | TokenKind::KeywordBool
                | TokenKind::KeywordVoid
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "("),
            TokenKind::RightParenthesis => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::Equal => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::IntegerLiteral => write!(f, "INT"),
            TokenKind::FloatLiteral => write!(f, "FLOAT"),
            TokenKind::StringLiteral => write!(f, "STRING"),
            TokenKind::Ident => write!(f, "IDENT"),
            TokenKind::KeywordFn => write!(f, "fn"),
            TokenKind::KeywordClass => write!(f, "class"),
            TokenKind::KeywordProp => write!(f, "prop"),
            TokenKind::KeywordTrue => write!(f, "true"),
            TokenKind::KeywordFalse => write!(f, "false"),
            TokenKind::KeywordIf => write!(f, "if"),
            TokenKind::KeywordElse => write!(f, "else"),
            TokenKind::KeywordReturn => write!(f, "return"),
            TokenKind::KeywordNew => write!(f, "new"),
            TokenKind::KeywordVar => write!(f, "var"),
            TokenKind::KeywordVoid => write!(f, "void"),
            TokenKind::KeywordInt => write!(f, "int"),
            TokenKind::KeywordFloat => write!(f, "float"),
            TokenKind::KeywordString => write!(f, "string"),
            TokenKind::KeywordBool => write!(f, "bool"),
            TokenKind::KeywordCall => write!(f, "call"),
            TokenKind::KeywordPrint => write!(f, "print"),
            TokenKind::Illegal => write!(f, "ILLEGAL"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The literal text of the token. String literals do not include their quotes.
    pub literal: CompactString,
    pub span: Span,
}
