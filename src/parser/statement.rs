use super::expression::Expression;
use crate::lexer::Span;
use crate::string::Ident;
use std::fmt::{self, Display};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    // Declarations
    VariableDecl(VariableDecl),
    FunctionDecl(FunctionDecl),
    ClassDecl(ClassDecl),
    // Non-declarations
    Expression(ExpressionStatement),
    Return(ReturnStatement),
    Call(CallStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: Ident,
    pub type_name: Option<Ident>,
    pub initial: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Ident,
    pub type_name: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Ident>,
    pub body: Rc<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: Ident,
    pub type_name: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `call name;` invokes `name` without arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub callee: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    pub span: Span,
}

impl BlockStatement {
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.body.iter()
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(type_name) = &self.type_name {
            write!(f, ": {type_name}")?;
        }
        Ok(())
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in self.body.iter() {
            write!(f, " {stmt}")?;
        }
        write!(f, " }}")
    }
}

impl Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ")")?;
        if let Some(return_type) = &self.return_type {
            write!(f, ": {return_type}")?;
        }
        write!(f, " {}", self.body)
    }
}

impl Display for PropertyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prop {}: {};", self.name, self.type_name)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::VariableDecl(decl) => {
                write!(f, "var {}", decl.name)?;
                if let Some(type_name) = &decl.type_name {
                    write!(f, ": {type_name}")?;
                }
                if let Some(initial) = &decl.initial {
                    write!(f, " = {initial}")?;
                }
                write!(f, ";")
            }
            Statement::FunctionDecl(decl) => write!(f, "{decl}"),
            Statement::ClassDecl(decl) => {
                write!(f, "class {} {{", decl.name)?;
                for property in decl.properties.iter() {
                    write!(f, " {property}")?;
                }
                for method in decl.methods.iter() {
                    write!(f, " {method}")?;
                }
                write!(f, " }}")
            }
            Statement::Expression(stmt) => write!(f, "{};", stmt.expr),
            Statement::Return(stmt) => match &stmt.value {
                Some(value) => write!(f, "return {value};"),
                None => write!(f, "return;"),
            },
            Statement::Call(stmt) => write!(f, "call {};", stmt.callee),
        }
    }
}
