use super::error::{ParserError, ParserErrorKind};
use super::Program;
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ProgramFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugProgramFormatter;

impl ProgramFormatter for DebugProgramFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders programs as source text and errors as `[line N] message`.
pub struct BasicProgramFormatter {
    line_breaks: LineBreaks,
}

impl BasicProgramFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ProgramFormatter for BasicProgramFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] {error}")
    }
}

pub struct PrettyProgramFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyProgramFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ProgramFormatter for PrettyProgramFormatter<'src> {
    fn format(&self, program: &Program) -> String {
        format!("{program}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        let (message, label) = match &error.kind {
            ParserErrorKind::UnexpectedToken { expected, actual } => (
                "Encountered an unexpected token",
                format!(
                    "Expected {} but got {} instead",
                    expected.fg(Color::BrightCyan),
                    actual.fg(Color::BrightRed)
                ),
            ),
            ParserErrorKind::NoPrefixRule(kind) => (
                "Expected the start of an expression",
                format!("{} cannot begin an expression", kind.fg(Color::BrightRed)),
            ),
            ParserErrorKind::InvalidInteger(literal) => (
                "Integer literal is out of range",
                format!("{} does not fit in 64 bits", literal.fg(Color::BrightRed)),
            ),
            ParserErrorKind::InvalidFloat(literal) => (
                "Malformed float literal",
                format!("{} is not a valid float", literal.fg(Color::BrightRed)),
            ),
            ParserErrorKind::InvalidAssignmentTarget(target) => (
                "Attempted to assign to something that is not a variable or property",
                format!("{} cannot be assigned to", target.fg(Color::BrightRed)),
            ),
        };
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
