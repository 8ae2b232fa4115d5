use super::{ProgramState, SystemContext};
use crate::environment::SharedEnvironment;
use crate::lexer::Span;
use crate::parser::expression::{
    AssignTarget, Expression, ExpressionAtom, ExpressionAtomKind, FunctionLiteral, IfExpression,
    PrefixOperator,
};
use crate::parser::statement::{
    BlockStatement, CallStatement, ClassDecl, FunctionDecl, ReturnStatement, Statement,
    VariableDecl,
};
use crate::parser::Program;
use crate::stack::ensure_sufficient_stack;
use crate::string::Ident;
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Class, Function, HashTable, Instance, Value};
use std::rc::Rc;

pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: SharedEnvironment,
    context: C,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            environment: SharedEnvironment::new(),
            context,
        }
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Runs every statement of the program in the global scope and yields the value of the last
    /// one, or the value of a top level `return`.
    ///
    /// Globals persist between calls, so a program can be fed in pieces.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let environment = self.environment.clone();
        let mut result = Value::Null;
        for stmt in program.iter() {
            match self.interpret_statement(&environment, stmt) {
                Ok(ProgramState::Run(value)) => result = value,
                Ok(ProgramState::Return(value)) => return Ok(value),
                Err(error) => {
                    tracing::debug!(code = error.code(), %error, "runtime error");
                    return Err(error);
                }
            }
        }
        Ok(result)
    }
}

// Statement interpreter
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn interpret_statement(
        &mut self,
        environment: &SharedEnvironment,
        statement: &Statement,
    ) -> Result<ProgramState, RuntimeError> {
        match statement {
            Statement::VariableDecl(decl) => self.interpret_variable_declaration(environment, decl),
            Statement::FunctionDecl(decl) => {
                Ok(self.interpret_function_declaration(environment, decl))
            }
            Statement::ClassDecl(decl) => Ok(self.interpret_class_declaration(environment, decl)),
            Statement::Expression(stmt) => match &stmt.expr {
                // A `return` inside an `if` must keep unwinding past the statement.
                Expression::If(expr) => self.interpret_if(environment, expr),
                expr => Ok(ProgramState::Run(self.evaluate(environment, expr)?)),
            },
            Statement::Return(stmt) => self.interpret_return_statement(environment, stmt),
            Statement::Call(stmt) => self.interpret_call_statement(environment, stmt),
        }
    }

    fn interpret_variable_declaration(
        &mut self,
        environment: &SharedEnvironment,
        decl: &VariableDecl,
    ) -> Result<ProgramState, RuntimeError> {
        let initial = match (&decl.initial, &decl.type_name) {
            (Some(expr), _) => self.evaluate(environment, expr)?,
            (None, Some(type_name)) => Value::zero_value(&type_name.name),
            (None, None) => Value::Null,
        };
        environment.declare(&decl.name.name, initial);
        Ok(ProgramState::Run(Value::Null))
    }

    fn interpret_function_declaration(
        &mut self,
        environment: &SharedEnvironment,
        decl: &FunctionDecl,
    ) -> ProgramState {
        let function = Self::make_function(environment, decl);
        environment.declare(&decl.name.name, Value::Function(function));
        ProgramState::Run(Value::Null)
    }

    fn interpret_class_declaration(
        &mut self,
        environment: &SharedEnvironment,
        decl: &ClassDecl,
    ) -> ProgramState {
        let properties = decl
            .properties
            .iter()
            .map(|property| {
                (
                    property.name.name.clone(),
                    Value::zero_value(&property.type_name.name),
                )
            })
            .collect();
        let methods = decl
            .methods
            .iter()
            .map(|method| (method.name.name.clone(), Self::make_function(environment, method)))
            .collect();

        let class = Class {
            name: decl.name.name.clone(),
            properties,
            methods,
        };
        environment.declare(&decl.name.name, Value::Class(Rc::new(class)));
        ProgramState::Run(Value::Null)
    }

    fn make_function(environment: &SharedEnvironment, decl: &FunctionDecl) -> Rc<Function> {
        Rc::new(Function {
            parameters: decl.parameters.clone(),
            body: decl.body.clone(),
            closure: environment.clone(),
        })
    }

    fn interpret_return_statement(
        &mut self,
        environment: &SharedEnvironment,
        stmt: &ReturnStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(environment, expr)?,
            None => Value::Null,
        };
        Ok(ProgramState::Return(value))
    }

    fn interpret_call_statement(
        &mut self,
        environment: &SharedEnvironment,
        stmt: &CallStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let callee = self.read_variable(environment, &stmt.callee)?;
        let result = self.call(callee, Vec::new(), stmt.span)?;
        Ok(ProgramState::Run(result))
    }

    /// Blocks share the scope they appear in. Only function calls open a new one.
    fn interpret_block(
        &mut self,
        environment: &SharedEnvironment,
        block: &BlockStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let mut state = ProgramState::Run(Value::Null);
        for stmt in block.iter() {
            state = self.interpret_statement(environment, stmt)?;
            if matches!(state, ProgramState::Return(_)) {
                break;
            }
        }
        Ok(state)
    }

    fn interpret_if(
        &mut self,
        environment: &SharedEnvironment,
        expr: &IfExpression,
    ) -> Result<ProgramState, RuntimeError> {
        if self.evaluate(environment, &expr.condition)?.is_truthy() {
            self.interpret_block(environment, &expr.consequence)
        } else if let Some(alternative) = &expr.alternative {
            self.interpret_block(environment, alternative)
        } else {
            Ok(ProgramState::Run(Value::Null))
        }
    }
}

// Expression evaluator
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn evaluate(
        &mut self,
        environment: &SharedEnvironment,
        expr: &Expression,
    ) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.evaluate_expression(environment, expr))
    }

    fn evaluate_expression(
        &mut self,
        environment: &SharedEnvironment,
        expr: &Expression,
    ) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Atom(atom) => self.evaluate_atom(environment, atom),
            Expression::Prefix { operator, rhs, span } => {
                let rhs = self.evaluate(environment, rhs)?;
                match operator {
                    PrefixOperator::Bang => Ok(rhs.logical_not()),
                    PrefixOperator::Minus => rhs
                        .numeric_negate()
                        .map_err(|kind| RuntimeError::new(kind, *span)),
                }
            }
            Expression::Infix {
                operator,
                lhs,
                rhs,
                span,
            } => {
                let lhs = self.evaluate(environment, lhs)?;
                let rhs = self.evaluate(environment, rhs)?;
                lhs.apply_infix(*operator, &rhs)
                    .map_err(|kind| RuntimeError::new(kind, *span))
            }
            // Outside of statement position a `return` only ends the `if` itself.
            Expression::If(expr) => match self.interpret_if(environment, expr)? {
                ProgramState::Run(value) | ProgramState::Return(value) => Ok(value),
            },
            Expression::Function(FunctionLiteral {
                parameters, body, ..
            }) => Ok(Value::Function(Rc::new(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                closure: environment.clone(),
            }))),
            Expression::Call {
                callee,
                arguments,
                span,
            } => {
                let callee = self.evaluate(environment, callee)?;
                let arguments = self.evaluate_all(environment, arguments)?;
                self.call(callee, arguments, *span)
            }
            Expression::New {
                class,
                arguments,
                span,
            } => self.instantiate(environment, class, arguments, *span),
            Expression::Get { object, name, span } => {
                let object = self.evaluate(environment, object)?;
                Self::read_property(&object, name, *span)
            }
            Expression::Assign {
                target,
                value,
                span,
            } => self.assign(environment, target, value, *span),
            Expression::Array { elements, .. } => {
                let elements = self.evaluate_all(environment, elements)?;
                Ok(Value::Array(Rc::new(elements)))
            }
            Expression::Hash { pairs, .. } => {
                let mut table = HashTable::new();
                for (key_expr, value_expr) in pairs.iter() {
                    let key = self.evaluate(environment, key_expr)?;
                    let value = self.evaluate(environment, value_expr)?;
                    table
                        .insert(key, value)
                        .map_err(|kind| RuntimeError::new(kind, key_expr.get_span()))?;
                }
                Ok(Value::Hash(Rc::new(table)))
            }
            Expression::Index {
                collection,
                index,
                span,
            } => {
                let collection = self.evaluate(environment, collection)?;
                let index = self.evaluate(environment, index)?;
                Self::index(&collection, &index).map_err(|kind| RuntimeError::new(kind, *span))
            }
        }
    }

    fn evaluate_atom(
        &mut self,
        environment: &SharedEnvironment,
        atom: &ExpressionAtom,
    ) -> Result<Value, RuntimeError> {
        let value = match &atom.kind {
            ExpressionAtomKind::Integer(v) => Value::Integer(*v),
            ExpressionAtomKind::Float(v) => Value::Float(*v),
            ExpressionAtomKind::Bool(v) => Value::Bool(*v),
            ExpressionAtomKind::StringLiteral(v) => Value::String(v.clone()),
            ExpressionAtomKind::Identifier(name) => environment.access(name).ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::UndefinedIdentifier(name.clone()),
                    atom.span,
                )
            })?,
        };
        Ok(value)
    }

    /// Evaluates left to right, stopping at the first error.
    fn evaluate_all(
        &mut self,
        environment: &SharedEnvironment,
        exprs: &[Expression],
    ) -> Result<Vec<Value>, RuntimeError> {
        exprs
            .iter()
            .map(|expr| self.evaluate(environment, expr))
            .collect()
    }

    fn read_variable(
        &self,
        environment: &SharedEnvironment,
        ident: &Ident,
    ) -> Result<Value, RuntimeError> {
        environment.access(&ident.name).ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::UndefinedIdentifier(ident.name.clone()),
                ident.span,
            )
        })
    }

    /// Parameters are bound positionally. Missing arguments leave their parameter unbound and
    /// extra arguments are dropped.
    fn call(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                tracing::trace!(
                    parameters = function.parameters.len(),
                    arguments = arguments.len(),
                    "calling function"
                );
                let environment = function.closure.new_scope();
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    environment.declare(&parameter.name.name, argument);
                }
                let state = ensure_sufficient_stack(|| {
                    self.interpret_block(&environment, &function.body)
                })?;
                match state {
                    ProgramState::Run(value) | ProgramState::Return(value) => Ok(value),
                }
            }
            Value::NativeFunction(native) => {
                tracing::trace!(name = native.get_name(), "calling builtin");
                native
                    .call(arguments, &mut self.context)
                    .map_err(|kind| RuntimeError::new(kind, span))
            }
            v => Err(RuntimeError::new(
                RuntimeErrorKind::NotAFunction(v.type_name()),
                span,
            )),
        }
    }

    /// Arguments are evaluated but not bound to anything.
    fn instantiate(
        &mut self,
        environment: &SharedEnvironment,
        class: &Ident,
        arguments: &[Expression],
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let class = match self.read_variable(environment, class)? {
            Value::Class(class) => class,
            v => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::NotAClass(v.type_name()),
                    span,
                ))
            }
        };
        let _ = self.evaluate_all(environment, arguments)?;
        tracing::trace!(class = %class.name, "instantiating class");
        Ok(Value::Instance(Rc::new(class.instantiate())))
    }

    /// Own properties shadow methods. Methods come back as plain functions with no receiver.
    fn read_property(object: &Value, name: &Ident, span: Span) -> Result<Value, RuntimeError> {
        let instance = Self::expect_instance(object, span)?;
        if let Some(value) = instance.get_property(&name.name) {
            return Ok(value);
        }
        match instance.class.find_method(&name.name) {
            Some(method) => Ok(Value::Function(method)),
            None => Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedProperty(name.name.clone()),
                name.span,
            )),
        }
    }

    fn expect_instance(object: &Value, span: Span) -> Result<&Rc<Instance>, RuntimeError> {
        match object {
            Value::Instance(instance) => Ok(instance),
            v => Err(RuntimeError::new(
                RuntimeErrorKind::NotAnInstance(v.type_name()),
                span,
            )),
        }
    }

    fn assign(
        &mut self,
        environment: &SharedEnvironment,
        target: &AssignTarget,
        value: &Expression,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match target {
            AssignTarget::Variable(name) => {
                let value = self.evaluate(environment, value)?;
                environment.declare(&name.name, value.clone());
                Ok(value)
            }
            AssignTarget::Property { object, name } => {
                let object = self.evaluate(environment, object)?;
                let instance = Self::expect_instance(&object, span)?;
                let value = self.evaluate(environment, value)?;
                instance.set_property(&name.name, value.clone());
                Ok(value)
            }
        }
    }

    /// Out of range array indices, negative ones included, give null.
    fn index(collection: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
        match (collection, index) {
            (Value::Array(elements), Value::Integer(i)) => Ok(usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .unwrap_or(Value::Null)),
            (Value::Hash(table), key) => Ok(table.get(key)?.cloned().unwrap_or(Value::Null)),
            (v, _) => Err(RuntimeErrorKind::UnsupportedIndex(v.type_name())),
        }
    }
}
