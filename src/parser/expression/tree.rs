use super::{InfixOperator, PrefixOperator};
use crate::lexer::Span;
use crate::parser::statement::{BlockStatement, Parameter};
use crate::string::{Ident, IdentName};
use compact_str::CompactString;
use std::fmt::{self, Display};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionAtomKind {
    Integer(i64),
    Float(f64),
    Bool(bool),
    StringLiteral(CompactString),
    Identifier(IdentName),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionAtom {
    pub kind: ExpressionAtomKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Parameter>,
    pub body: Rc<BlockStatement>,
    pub span: Span,
}

/// The left hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Variable(Ident),
    Property { object: Box<Expression>, name: Ident },
}

impl TryFrom<Expression> for AssignTarget {
    type Error = Expression;

    fn try_from(expr: Expression) -> Result<Self, Self::Error> {
        match expr {
            Expression::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::Identifier(name),
                span,
            }) => Ok(AssignTarget::Variable(Ident { name, span })),
            Expression::Get { object, name, .. } => Ok(AssignTarget::Property { object, name }),
            expr => Err(expr),
        }
    }
}

impl Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Variable(name) => write!(f, "{name}"),
            AssignTarget::Property { object, name } => write!(f, "{object}.{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Atom(ExpressionAtom),
    Prefix {
        operator: PrefixOperator,
        rhs: Box<Expression>,
        span: Span,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        span: Span,
    },
    If(IfExpression),
    Function(FunctionLiteral),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    /// `new ClassName(args)`
    New {
        class: Ident,
        arguments: Vec<Expression>,
        span: Span,
    },
    /// Property access `object.name`.
    Get {
        object: Box<Expression>,
        name: Ident,
        span: Span,
    },
    Assign {
        target: AssignTarget,
        value: Box<Expression>,
        span: Span,
    },
    Array {
        elements: Vec<Expression>,
        span: Span,
    },
    Hash {
        pairs: Vec<(Expression, Expression)>,
        span: Span,
    },
    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn get_span(&self) -> Span {
        match self {
            Expression::Atom(atom) => atom.span,
            Expression::If(expr) => expr.span,
            Expression::Function(function) => function.span,
            Expression::Prefix { span, .. }
            | Expression::Infix { span, .. }
            | Expression::Call { span, .. }
            | Expression::New { span, .. }
            | Expression::Get { span, .. }
            | Expression::Assign { span, .. }
            | Expression::Array { span, .. }
            | Expression::Hash { span, .. }
            | Expression::Index { span, .. } => *span,
        }
    }
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Positional notation with a `.` so the lexer reads the same literal back.
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    let text = value.to_string();
    if text.contains('.') {
        write!(f, "{text}")
    } else {
        write!(f, "{text}.0")
    }
}

impl Display for ExpressionAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionAtomKind::Integer(v) => write!(f, "{v}"),
            ExpressionAtomKind::Float(v) => write_float(f, *v),
            ExpressionAtomKind::Bool(v) => write!(f, "{v}"),
            ExpressionAtomKind::StringLiteral(v) => write!(f, "\"{v}\""),
            ExpressionAtomKind::Identifier(name) => write!(f, "{name}"),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Atom(atom) => write!(f, "{atom}"),
            Expression::Prefix { operator, rhs, .. } => write!(f, "({operator}{rhs})"),
            Expression::Infix {
                operator, lhs, rhs, ..
            } => write!(f, "({lhs} {operator} {rhs})"),
            Expression::If(IfExpression {
                condition,
                consequence,
                alternative,
                ..
            }) => {
                write!(f, "if {condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            }
            Expression::Function(FunctionLiteral {
                parameters, body, ..
            }) => {
                write!(f, "fn(")?;
                write_list(f, parameters)?;
                write!(f, ") {body}")
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                write!(f, "{callee}(")?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expression::New {
                class, arguments, ..
            } => {
                write!(f, "new {class}(")?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expression::Get { object, name, .. } => write!(f, "{object}.{name}"),
            Expression::Assign { target, value, .. } => write!(f, "({target} = {value})"),
            Expression::Array { elements, .. } => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expression::Hash { pairs, .. } => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::Index {
                collection, index, ..
            } => write!(f, "({collection}[{index}])"),
        }
    }
}
