pub mod error;
pub mod expression;
pub mod formatter;
mod program;
pub mod statement;

use crate::lexer::{Lexer, LineBreaks, Span, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use crate::string::Ident;
use error::{ParserError, ParserErrorKind};
use expression::{
    AssignTarget, Expression, ExpressionAtom, ExpressionAtomKind, FunctionLiteral, IfExpression,
    InfixOperator, Precedence, PrefixOperator,
};
pub use program::Program;
use statement::{
    BlockStatement, CallStatement, ClassDecl, ExpressionStatement, FunctionDecl, Parameter,
    PropertyDecl, ReturnStatement, Statement, VariableDecl,
};
use std::rc::Rc;

/// Parses a whole source file, returning every syntax error found if there are any.
pub fn parse(source: &str) -> Result<Program, Vec<ParserError>> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

/// Pratt parser over a pull-based token stream.
///
/// Every parse routine starts with `current` on the first token of its construct and leaves
/// `current` on the last one. Failed routines record a diagnostic and return `None`, after which
/// the caller skips ahead one token and keeps going.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<ParserError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn get_errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.lexer.get_line_breaks()
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, expected: TokenKind) -> Option<()> {
        if self.peek_is(expected) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(expected);
            None
        }
    }

    fn expect_type_name(&mut self) -> Option<Ident> {
        if self.peek.kind.is_type_name() {
            self.next_token();
            Some(Ident::from(&self.current))
        } else {
            self.peek_error(TokenKind::Ident);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(ParserError {
            kind: ParserErrorKind::UnexpectedToken {
                expected,
                actual: self.peek.kind,
            },
            span: self.peek.span,
        });
    }

    fn current_error(&mut self, expected: TokenKind) {
        self.errors.push(ParserError {
            kind: ParserErrorKind::UnexpectedToken {
                expected,
                actual: self.current.kind,
            },
            span: self.current.span,
        });
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(&self.current.span)
    }
}

// Statements
impl<'src> Parser<'src> {
    pub fn parse_program(&mut self) -> Program {
        tracing::debug!(length = self.lexer.get_source().len(), "parsing program");
        let mut statements = Vec::new();
        while !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "finished parsing"
        );
        Program::new(statements)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::KeywordClass => self.parse_class_decl().map(Statement::ClassDecl),
            TokenKind::KeywordVar => self.parse_variable_decl().map(Statement::VariableDecl),
            TokenKind::KeywordReturn => self.parse_return().map(Statement::Return),
            TokenKind::KeywordFn if self.peek_is(TokenKind::Ident) => {
                self.parse_function_decl().map(Statement::FunctionDecl)
            }
            TokenKind::KeywordCall => self.parse_call_statement().map(Statement::Call),
            _ => self
                .parse_expression_statement()
                .map(Statement::Expression),
        }
    }

    fn parse_variable_decl(&mut self) -> Option<VariableDecl> {
        let start = self.current.span;
        self.expect_peek(TokenKind::Ident)?;
        let name = Ident::from(&self.current);

        let type_name = if self.peek_is(TokenKind::Colon) {
            self.next_token();
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let initial = if self.peek_is(TokenKind::Equal) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(VariableDecl {
            name,
            type_name,
            initial,
            span: self.span_from(start),
        })
    }

    fn parse_return(&mut self) -> Option<ReturnStatement> {
        let start = self.current.span;
        // A bare `return` may close a block without a semicolon.
        if matches!(
            self.peek.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) {
            if self.peek_is(TokenKind::Semicolon) {
                self.next_token();
            }
            return Some(ReturnStatement {
                value: None,
                span: self.span_from(start),
            });
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Semicolon)?;
        Some(ReturnStatement {
            value: Some(value),
            span: self.span_from(start),
        })
    }

    fn parse_function_decl(&mut self) -> Option<FunctionDecl> {
        let start = self.current.span;
        self.expect_peek(TokenKind::Ident)?;
        let name = Ident::from(&self.current);

        self.expect_peek(TokenKind::LeftParenthesis)?;
        let parameters = self.parse_parameters()?;

        let return_type = if self.peek_is(TokenKind::Colon) {
            self.next_token();
            Some(self.expect_type_name()?)
        } else {
            None
        };

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block()?;

        Some(FunctionDecl {
            name,
            parameters,
            return_type,
            body: Rc::new(body),
            span: self.span_from(start),
        })
    }

    fn parse_class_decl(&mut self) -> Option<ClassDecl> {
        let start = self.current.span;
        self.expect_peek(TokenKind::Ident)?;
        let name = Ident::from(&self.current);
        self.expect_peek(TokenKind::LeftBrace)?;
        self.next_token();

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        while !self.current_is(TokenKind::RightBrace) {
            match self.current.kind {
                TokenKind::KeywordProp => properties.push(self.parse_property_decl()?),
                TokenKind::KeywordFn => methods.push(self.parse_function_decl()?),
                TokenKind::Semicolon => {}
                TokenKind::Eof => {
                    self.current_error(TokenKind::RightBrace);
                    return None;
                }
                _ => {
                    self.current_error(TokenKind::KeywordProp);
                    return None;
                }
            }
            self.next_token();
        }

        Some(ClassDecl {
            name,
            properties,
            methods,
            span: self.span_from(start),
        })
    }

    fn parse_property_decl(&mut self) -> Option<PropertyDecl> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Ident::from(&self.current);
        self.expect_peek(TokenKind::Colon)?;
        let type_name = self.expect_type_name()?;
        self.expect_peek(TokenKind::Semicolon)?;
        Some(PropertyDecl { name, type_name })
    }

    fn parse_call_statement(&mut self) -> Option<CallStatement> {
        let start = self.current.span;
        self.expect_peek(TokenKind::Ident)?;
        let callee = Ident::from(&self.current);
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(CallStatement {
            callee,
            span: self.span_from(start),
        })
    }

    fn parse_expression_statement(&mut self) -> Option<ExpressionStatement> {
        let start = self.current.span;
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(ExpressionStatement {
            expr,
            span: self.span_from(start),
        })
    }

    fn parse_block(&mut self) -> Option<BlockStatement> {
        let start = self.current.span;
        self.next_token();

        let mut body = Vec::new();
        while !self.current_is(TokenKind::RightBrace) {
            if self.current_is(TokenKind::Eof) {
                self.current_error(TokenKind::RightBrace);
                return None;
            }
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            }
            self.next_token();
        }

        Some(BlockStatement {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_parameters(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RightParenthesis) {
            self.next_token();
            return Some(parameters);
        }

        loop {
            self.expect_peek(TokenKind::Ident)?;
            let name = Ident::from(&self.current);
            let type_name = if self.peek_is(TokenKind::Colon) {
                self.next_token();
                Some(self.expect_type_name()?)
            } else {
                None
            };
            parameters.push(Parameter { name, type_name });

            if !self.peek_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
        }

        self.expect_peek(TokenKind::RightParenthesis)?;
        Some(parameters)
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        ensure_sufficient_stack(|| self.parse_expression_at(precedence))
    }

    fn parse_expression_at(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut lhs = self.parse_prefix()?;
        while !self.peek_is(TokenKind::Semicolon) && precedence < Precedence::of(self.peek.kind) {
            self.next_token();
            lhs = self.parse_infix(lhs)?;
        }
        Some(lhs)
    }

    fn atom(&self, kind: ExpressionAtomKind) -> Expression {
        Expression::Atom(ExpressionAtom {
            kind,
            span: self.current.span,
        })
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let expr = match token.kind {
            TokenKind::Ident => {
                self.atom(ExpressionAtomKind::Identifier(token.literal.as_str().into()))
            }
            TokenKind::IntegerLiteral => match token.literal.parse::<i64>() {
                Ok(value) => self.atom(ExpressionAtomKind::Integer(value)),
                Err(_) => {
                    self.errors.push(ParserError {
                        kind: ParserErrorKind::InvalidInteger(token.literal),
                        span: token.span,
                    });
                    return None;
                }
            },
            TokenKind::FloatLiteral => match token.literal.parse::<f64>() {
                Ok(value) => self.atom(ExpressionAtomKind::Float(value)),
                Err(_) => {
                    self.errors.push(ParserError {
                        kind: ParserErrorKind::InvalidFloat(token.literal),
                        span: token.span,
                    });
                    return None;
                }
            },
            TokenKind::StringLiteral => {
                self.atom(ExpressionAtomKind::StringLiteral(token.literal.clone()))
            }
            TokenKind::KeywordTrue => self.atom(ExpressionAtomKind::Bool(true)),
            TokenKind::KeywordFalse => self.atom(ExpressionAtomKind::Bool(false)),
            TokenKind::Bang | TokenKind::Minus => {
                let operator = PrefixOperator::from_token(token.kind)?;
                self.next_token();
                let rhs = self.parse_expression(Precedence::Prefix)?;
                Expression::Prefix {
                    operator,
                    rhs: Box::new(rhs),
                    span: self.span_from(token.span),
                }
            }
            TokenKind::LeftParenthesis => {
                self.next_token();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RightParenthesis)?;
                inner
            }
            TokenKind::KeywordFn => {
                self.expect_peek(TokenKind::LeftParenthesis)?;
                let parameters = self.parse_parameters()?;
                self.expect_peek(TokenKind::LeftBrace)?;
                let body = self.parse_block()?;
                Expression::Function(FunctionLiteral {
                    parameters,
                    body: Rc::new(body),
                    span: self.span_from(token.span),
                })
            }
            TokenKind::KeywordNew => {
                self.expect_peek(TokenKind::Ident)?;
                let class = Ident::from(&self.current);
                self.expect_peek(TokenKind::LeftParenthesis)?;
                let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
                Expression::New {
                    class,
                    arguments,
                    span: self.span_from(token.span),
                }
            }
            // `print(...)` is sugar for calling the `print` builtin.
            TokenKind::KeywordPrint => {
                let callee = self.atom(ExpressionAtomKind::Identifier("print".into()));
                self.expect_peek(TokenKind::LeftParenthesis)?;
                let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
                Expression::Call {
                    callee: Box::new(callee),
                    arguments,
                    span: self.span_from(token.span),
                }
            }
            TokenKind::LeftBracket => {
                let elements = self.parse_expression_list(TokenKind::RightBracket)?;
                Expression::Array {
                    elements,
                    span: self.span_from(token.span),
                }
            }
            TokenKind::LeftBrace => self.parse_hash_literal()?,
            TokenKind::KeywordIf => Expression::If(self.parse_if_expression()?),
            kind => {
                self.errors.push(ParserError {
                    kind: ParserErrorKind::NoPrefixRule(kind),
                    span: token.span,
                });
                return None;
            }
        };
        Some(expr)
    }

    fn parse_infix(&mut self, lhs: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let start = lhs.get_span();
        let expr = match token.kind {
            TokenKind::LeftParenthesis => {
                let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
                Expression::Call {
                    callee: Box::new(lhs),
                    arguments,
                    span: self.span_from(start),
                }
            }
            TokenKind::LeftBracket => {
                self.next_token();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RightBracket)?;
                Expression::Index {
                    collection: Box::new(lhs),
                    index: Box::new(index),
                    span: self.span_from(start),
                }
            }
            TokenKind::Dot => {
                self.expect_peek(TokenKind::Ident)?;
                Expression::Get {
                    object: Box::new(lhs),
                    name: Ident::from(&self.current),
                    span: self.span_from(start),
                }
            }
            // Right associative, so the value is parsed at the lowest precedence.
            TokenKind::Equal => {
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                let target = match AssignTarget::try_from(lhs) {
                    Ok(target) => target,
                    Err(lhs) => {
                        self.errors.push(ParserError {
                            kind: ParserErrorKind::InvalidAssignmentTarget(lhs.to_string()),
                            span: start,
                        });
                        return None;
                    }
                };
                Expression::Assign {
                    target,
                    value: Box::new(value),
                    span: self.span_from(start),
                }
            }
            kind => {
                let Some(operator) = InfixOperator::from_token(kind) else {
                    return Some(lhs);
                };
                let precedence = Precedence::of(kind);
                self.next_token();
                let rhs = self.parse_expression(precedence)?;
                Expression::Infix {
                    operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    span: self.span_from(start),
                }
            }
        };
        Some(expr)
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(items)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let start = self.current.span;
        let mut pairs = Vec::new();
        while !self.peek_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RightBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RightBrace)?;

        Some(Expression::Hash {
            pairs,
            span: self.span_from(start),
        })
    }

    fn parse_if_expression(&mut self) -> Option<IfExpression> {
        let start = self.current.span;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_is(TokenKind::KeywordElse) {
            self.next_token();
            if self.peek_is(TokenKind::KeywordIf) {
                self.next_token();
                let nested = self.parse_if_expression()?;
                let span = nested.span;
                Some(BlockStatement {
                    body: vec![Statement::Expression(ExpressionStatement {
                        expr: Expression::If(nested),
                        span,
                    })],
                    span,
                })
            } else {
                self.expect_peek(TokenKind::LeftBrace)?;
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Some(IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
            span: self.span_from(start),
        })
    }
}
