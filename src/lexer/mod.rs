mod cursor;
pub mod formatter;
mod token;

use compact_str::CompactString;
use cursor::SourceChar;
use std::{ops::Range, rc::Rc, str::Chars};
pub use token::{Span, SpanIndex, SpanLength, Token, TokenKind, KEYWORD_HASHMAP};

#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<SpanIndex>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor: SpanIndex = 0.into();
            for (offset, byte) in text.bytes().enumerate() {
                let offset = (offset + 1).into();
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..(text.len() + 1).into());
            }
            line_breaks
        } else {
            vec![0.into()..1.into()]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    pub fn get_line(&self, offset: SpanIndex) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

/// Converts source text into tokens on demand.
///
/// Once the input is exhausted every further call to [`Lexer::next_token`] yields another
/// `Eof` token positioned at the end of the source.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Chars<'src>,
    offset: SpanIndex,
    lookahead: Option<SourceChar>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            offset: 0.into(),
            lookahead: None,
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }
}

impl<'src> Lexer<'src> {
    fn advance(&mut self) -> Option<SourceChar> {
        let c = self.chars.next()?;
        let old_location = self.offset;
        self.offset = self.offset + c.len_utf8();
        Some(SourceChar {
            value: c,
            offset: old_location,
        })
    }

    fn next_char(&mut self) -> Option<SourceChar> {
        match self.lookahead.take() {
            Some(lookahead) => Some(lookahead),
            None => self.advance(),
        }
    }

    fn peek_char(&mut self) -> Option<SourceChar> {
        if self.lookahead.is_none() {
            self.lookahead = self.advance();
        }
        self.lookahead
    }

    fn eat_char(&mut self, expected: char) -> Option<SourceChar> {
        match self.peek_char() {
            Some(c) if c.value == expected => self.next_char(),
            _ => None,
        }
    }

    fn make_token(&self, kind: TokenKind, start: SpanIndex, end: SpanIndex) -> Token {
        let span = Span::new(start.into(), end.into());
        Token {
            kind,
            literal: CompactString::from(&self.source[span.range()]),
            span,
        }
    }

    fn eof(&self) -> Token {
        let end = self.source.len();
        Token {
            kind: TokenKind::Eof,
            literal: CompactString::default(),
            span: Span::new(end, end),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(current) = self.next_char() else {
                return self.eof();
            };

            let just = |lexer: &Self, kind: TokenKind| {
                lexer.make_token(kind, current.offset, current.next_offset())
            };

            let token = match current.value {
                ' ' | '\t' | '\n' | '\r' => continue,
                '/' => {
                    if self.eat_char('/').is_some() {
                        self.skip_line_comment();
                        continue;
                    }
                    just(self, TokenKind::Slash)
                }
                '=' => match self.eat_char('=') {
                    Some(second) => {
                        self.make_token(TokenKind::EqualEqual, current.offset, second.next_offset())
                    }
                    None => just(self, TokenKind::Equal),
                },
                '!' => match self.eat_char('=') {
                    Some(second) => {
                        self.make_token(TokenKind::BangEqual, current.offset, second.next_offset())
                    }
                    None => just(self, TokenKind::Bang),
                },
                // Single character tokens
                '(' => just(self, TokenKind::LeftParenthesis),
                ')' => just(self, TokenKind::RightParenthesis),
                '{' => just(self, TokenKind::LeftBrace),
                '}' => just(self, TokenKind::RightBrace),
                '[' => just(self, TokenKind::LeftBracket),
                ']' => just(self, TokenKind::RightBracket),
                ',' => just(self, TokenKind::Comma),
                '.' => just(self, TokenKind::Dot),
                ':' => just(self, TokenKind::Colon),
                ';' => just(self, TokenKind::Semicolon),
                '-' => just(self, TokenKind::Minus),
                '+' => just(self, TokenKind::Plus),
                '*' => just(self, TokenKind::Star),
                '<' => just(self, TokenKind::LessThan),
                '>' => just(self, TokenKind::GreaterThan),
                '"' => self.lex_string(current),
                _ if current.is_letter() => self.lex_ident_or_keyword(current),
                _ if current.is_digit() => self.lex_number(current),
                _ => just(self, TokenKind::Illegal),
            };
            return token;
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.next_char() {
            if c.value == '\n' {
                break;
            }
        }
    }

    fn lex_ident_or_keyword(&mut self, first: SourceChar) -> Token {
        let mut end = first.next_offset();
        while let Some(c) = self.peek_char() {
            if !c.is_letter() {
                break;
            }
            let _ = self.next_char();
            end = c.next_offset();
        }
        let mut token = self.make_token(TokenKind::Ident, first.offset, end);
        if let Some(keyword) = KEYWORD_HASHMAP.get(token.literal.as_str()) {
            token.kind = *keyword;
        }
        token
    }

    fn lex_number(&mut self, first: SourceChar) -> Token {
        let mut end = first.next_offset();
        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            match c.value {
                '0'..='9' => {}
                // A second dot ends the literal.
                '.' if !is_float => is_float = true,
                _ => break,
            }
            let _ = self.next_char();
            end = c.next_offset();
        }
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        self.make_token(kind, first.offset, end)
    }

    /// Unterminated strings run to the end of the input.
    fn lex_string(&mut self, quote: SourceChar) -> Token {
        let content_start = quote.next_offset();
        let mut content_end = content_start;
        let mut end = content_start;
        while let Some(c) = self.next_char() {
            if c.value == '"' {
                end = c.next_offset();
                break;
            }
            content_end = c.next_offset();
            end = content_end;
        }
        let content = Span::new(content_start.into(), content_end.into());
        Token {
            kind: TokenKind::StringLiteral,
            literal: CompactString::from(&self.source[content.range()]),
            span: Span::new(quote.offset.into(), end.into()),
        }
    }
}
