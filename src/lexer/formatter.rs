use super::{Lexer, LineBreaks, Token, TokenKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

pub struct BasicFormatter;

impl<'src> ToFormatter<BasicFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter {
        BasicFormatter {}
    }
}

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::StringLiteral => format!("STRING \"{}\"", token.literal),
            TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::Ident
            | TokenKind::Illegal => format!("{} {}", token.kind, token.literal),
            kind => format!("{kind}"),
        }
    }
}

/// Prefixes every token with its line number and byte range.
pub struct LineFormatter {
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<LineFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> LineFormatter {
        LineFormatter {
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl TokenFormatter for LineFormatter {
    fn format(&self, token: &Token) -> String {
        let line = self.line_breaks.get_line_from_span(token.span);
        let range = token.span.range();
        format!(
            "[line {line}] {}..{} {}",
            range.start,
            range.end,
            BasicFormatter.format(token)
        )
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }
}
