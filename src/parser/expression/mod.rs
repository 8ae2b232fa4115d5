mod operator;
mod tree;

pub use operator::{InfixOperator, Precedence, PrefixOperator};
pub use tree::{
    AssignTarget, Expression, ExpressionAtom, ExpressionAtomKind, FunctionLiteral, IfExpression,
};
