pub mod error;
pub mod formatter;
mod hash;

use crate::environment::SharedEnvironment;
use crate::interpreter::SystemContext;
use crate::parser::expression::{InfixOperator, PrefixOperator};
use crate::parser::statement::{BlockStatement, Parameter};
use crate::string::IdentName;
use compact_str::{CompactString, CompactStringExt};
use error::RuntimeErrorKind;
pub use hash::{fnv1a, HashKey, HashKeyKind, HashTable};
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

pub trait NativeFunction: fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn call(
        &self,
        arguments: Vec<Value>,
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind>;
}

#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<Parameter>,
    pub body: Rc<BlockStatement>,
    pub closure: SharedEnvironment,
}

// The closure can hold this function again, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: IdentName,
    /// Zero values of every declared property, in declaration order.
    pub properties: Vec<(IdentName, Value)>,
    pub methods: Vec<(IdentName, Rc<Function>)>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods
            .iter()
            .find(|(method, _)| &**method == name)
            .map(|(_, function)| function.clone())
    }

    /// Creates an instance with its own copy of the property defaults.
    pub fn instantiate(self: &Rc<Self>) -> Instance {
        Instance {
            class: self.clone(),
            properties: RefCell::new(self.properties.clone()),
        }
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub properties: RefCell<Vec<(IdentName, Value)>>,
}

impl Instance {
    pub fn get_property(&self, name: &str) -> Option<Value> {
        self.properties
            .borrow()
            .iter()
            .find(|(property, _)| &**property == name)
            .map(|(_, value)| value.clone())
    }

    /// Overwrites the property, creating it if the class never declared it.
    pub fn set_property(&self, name: &IdentName, value: Value) {
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(property, _)| property == name) {
            Some((_, slot)) => *slot = value,
            None => properties.push((name.clone(), value)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(CompactString),
    Bool(bool),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashTable>),
    NativeFunction(Rc<dyn NativeFunction>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Bool(_) => "BOOLEAN",
            Value::Function(_) => "FUNCTION",
            Value::Class(_) => "CLASS",
            Value::Instance(_) => "INSTANCE",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::NativeFunction(_) => "BUILTIN",
        }
    }

    /// The value a declared but uninitialized slot of the given type starts with.
    pub fn zero_value(type_name: &str) -> Value {
        match type_name.to_ascii_lowercase().as_str() {
            "int" => Value::Integer(0),
            "float" => Value::Float(0.0),
            "string" => Value::String(CompactString::default()),
            "bool" => Value::Bool(false),
            _ => Value::Null,
        }
    }
}

fn write_joined<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], mut write_item: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write_item(f, item)?;
    }
    Ok(())
}

/// The inspect form shown to users by `print` and at the end of a run.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.6}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Function(function) => {
                write!(f, "fn(")?;
                write_joined(f, function.parameters.as_slice(), |f, p| write!(f, "{}", p.name))?;
                writeln!(f, ") {{")?;
                for stmt in function.body.iter() {
                    writeln!(f, "{stmt}")?;
                }
                write!(f, "}}")
            }
            Value::Class(class) => {
                write!(f, "class {} {{", class.name)?;
                for (name, _) in class.properties.iter() {
                    write!(f, "\n  prop {name}")?;
                }
                for (name, _) in class.methods.iter() {
                    write!(f, "\n  fn {name}")?;
                }
                write!(f, "\n}}")
            }
            Value::Instance(instance) => {
                write!(f, "{} {{", instance.class.name)?;
                for (name, value) in instance.properties.borrow().iter() {
                    write!(f, "\n  {name}: {value}")?;
                }
                write!(f, "\n}}")
            }
            Value::Array(elements) => {
                write!(f, "[")?;
                write_joined(f, elements.as_slice(), |f, v| write!(f, "{v}"))?;
                write!(f, "]")
            }
            Value::Hash(table) => {
                write!(f, "{{")?;
                for (index, (key, value)) in table.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::NativeFunction(_) => write!(f, "builtin function"),
        }
    }
}

// Prefix operators
impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Null)
    }

    pub fn logical_not(&self) -> Value {
        Value::Bool(!self.is_truthy())
    }

    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Integer(v) => Ok(Value::Integer(v.wrapping_neg())),
            Value::Float(v) => Ok(Value::Float(-v)),
            v => Err(RuntimeErrorKind::UnknownPrefixOperator {
                operator: PrefixOperator::Minus,
                operand: v.type_name(),
            }),
        }
    }
}

// Infix operators
impl Value {
    fn unknown_operator(&self, operator: InfixOperator, other: &Value) -> RuntimeErrorKind {
        RuntimeErrorKind::UnknownInfixOperator {
            lhs: self.type_name(),
            operator,
            rhs: other.type_name(),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => {
                Ok(Value::Integer(lhs.wrapping_add(*rhs)))
            }
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Float(lhs + rhs)),
            (Value::String(lhs), Value::String(rhs)) => {
                Ok(Value::String([lhs, rhs].concat_compact()))
            }
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::Add, rhs)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => {
                Ok(Value::Integer(lhs.wrapping_sub(*rhs)))
            }
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Float(lhs - rhs)),
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::Subtract, rhs)),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => {
                Ok(Value::Integer(lhs.wrapping_mul(*rhs)))
            }
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Float(lhs * rhs)),
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::Multiply, rhs)),
        }
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(_), Value::Integer(0)) => Err(RuntimeErrorKind::DivisionByZero),
            (Value::Integer(lhs), Value::Integer(rhs)) => {
                Ok(Value::Integer(lhs.wrapping_div(*rhs)))
            }
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Float(lhs / rhs)),
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::Divide, rhs)),
        }
    }

    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Ok(Value::Bool(lhs < rhs)),
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Bool(lhs < rhs)),
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::LessThan, rhs)),
        }
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Ok(Value::Bool(lhs > rhs)),
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Bool(lhs > rhs)),
            (lhs, rhs) => Err(lhs.unknown_operator(InfixOperator::GreaterThan, rhs)),
        }
    }

    /// Scalars compare by value, arrays and hashes element-wise, everything else by identity.
    /// Values of different types are never equal.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs == rhs,
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Array(lhs), Value::Array(rhs)) => {
                lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(l, r)| l.is_equal(r))
            }
            (Value::Hash(lhs), Value::Hash(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs.iter().all(|(key, value)| {
                        matches!(rhs.get(key), Ok(Some(other)) if value.is_equal(other))
                    })
            }
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Class(lhs), Value::Class(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Instance(lhs), Value::Instance(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::NativeFunction(lhs), Value::NativeFunction(rhs)) => {
                lhs.get_name() == rhs.get_name()
            }
            _ => false,
        }
    }

    pub fn apply_infix(
        &self,
        operator: InfixOperator,
        other: &Value,
    ) -> Result<Value, RuntimeErrorKind> {
        match operator {
            InfixOperator::Add => self.add(other),
            InfixOperator::Subtract => self.subtract(other),
            InfixOperator::Multiply => self.multiply(other),
            InfixOperator::Divide => self.divide(other),
            InfixOperator::LessThan => self.less_than(other),
            InfixOperator::GreaterThan => self.greater_than(other),
            InfixOperator::EqualEqual => Ok(Value::Bool(self.is_equal(other))),
            InfixOperator::BangEqual => Ok(Value::Bool(!self.is_equal(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_scalars() {
        assert_eq!(Value::Integer(-12).to_string(), "-12");
        assert_eq!(Value::Float(2.5).to_string(), "2.500000");
        assert_eq!(Value::String("hi there".into()).to_string(), "hi there");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn inspect_collections() {
        let array = Value::Array(Rc::new(vec![
            Value::Integer(1),
            Value::String("two".into()),
        ]));
        assert_eq!(array.to_string(), "[1, two]");

        let mut table = HashTable::new();
        table.insert(Value::String("a".into()), Value::Integer(1)).unwrap();
        table.insert(Value::Bool(true), Value::Null).unwrap();
        assert_eq!(Value::Hash(Rc::new(table)).to_string(), "{a: 1, true: null}");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
    }

    #[test]
    fn mixed_numeric_arithmetic_is_rejected() {
        let result = Value::Integer(1).add(&Value::Float(1.0));
        assert_eq!(
            result.unwrap_err().to_string(),
            "unknown operator: INTEGER + FLOAT"
        );
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let result = Value::Integer(i64::MAX).add(&Value::Integer(1)).unwrap();
        assert!(result.is_equal(&Value::Integer(i64::MIN)));
    }

    #[test]
    fn zero_values() {
        assert!(Value::zero_value("int").is_equal(&Value::Integer(0)));
        assert!(Value::zero_value("float").is_equal(&Value::Float(0.0)));
        assert!(Value::zero_value("string").is_equal(&Value::String("".into())));
        assert!(Value::zero_value("bool").is_equal(&Value::Bool(false)));
        assert!(Value::zero_value("Point").is_equal(&Value::Null));
    }
}
