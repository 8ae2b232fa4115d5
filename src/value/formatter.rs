use super::error::{RuntimeError, RuntimeErrorKind};
use super::Value;
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Prints values in their inspect form and errors as `ERROR: message`.
pub struct BasicFormatter;

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("ERROR: {error}")
    }
}

/// Like [`BasicFormatter`] but also names the line the error happened on.
pub struct LineFormatter {
    line_breaks: LineBreaks,
}

impl LineFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ValueFormatter for LineFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] ERROR: {error}")
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> PrettyFormatter<'src> {
    fn describe(kind: &RuntimeErrorKind) -> (&'static str, String) {
        match kind {
            RuntimeErrorKind::UndefinedIdentifier(name) => (
                "Attempted to access a name that is not bound",
                format!("{} is not defined in any enclosing scope", name.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::UnknownPrefixOperator { operator, operand } => (
                "Operand does not support this prefix operator",
                format!(
                    "{} cannot be applied to {}",
                    operator.fg(Color::BrightCyan),
                    operand.fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::UnknownInfixOperator { lhs, operator, rhs } => (
                "Operands do not support this operator",
                format!(
                    "{} cannot be applied to {} and {}",
                    operator.fg(Color::BrightCyan),
                    lhs.fg(Color::BrightRed),
                    rhs.fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::DivisionByZero => (
                "Attempted to divide an integer by zero",
                "The divisor evaluates to 0".to_string(),
            ),
            RuntimeErrorKind::NotAFunction(actual) => (
                "Attempted to call a value that is not callable",
                format!("{} is not callable", actual.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::NotAClass(actual) => (
                "Attempted to instantiate a value that is not a class",
                format!("{} is not a class", actual.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::NotAnInstance(actual) => (
                "Attempted to access a property on a non-instance value",
                format!("{} has no properties", actual.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::UndefinedProperty(name) => (
                "Attempted to access an undefined property of an instance",
                format!(
                    "The `{}` property is not defined on the instance",
                    name.fg(Color::BrightYellow)
                ),
            ),
            RuntimeErrorKind::InvalidArgumentCount { actual, expected } => (
                "Called a builtin with the wrong number of arguments",
                format!(
                    "Expected {} arguments but got {} instead",
                    expected.fg(Color::BrightCyan),
                    actual.fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::UnsupportedArgument { name, actual }
            | RuntimeErrorKind::NonArrayArgument { name, actual } => (
                "Called a builtin with an argument of the wrong type",
                format!(
                    "`{}` does not accept {}",
                    name.fg(Color::BrightCyan),
                    actual.fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::UnsupportedIndex(actual) => (
                "Attempted to index a value that cannot be indexed",
                format!("{} cannot be indexed", actual.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::UnhashableKey(actual) => (
                "Attempted to key a hash with an unhashable value",
                format!("{} cannot be used as a key", actual.fg(Color::BrightRed)),
            ),
        }
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        let (message, label) = Self::describe(&error.kind);
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(message)
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
