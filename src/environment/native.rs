use crate::interpreter::SystemContext;
use crate::value::{error::RuntimeErrorKind, NativeFunction, Value};
use std::rc::Rc;

pub fn native_functions() -> Vec<Rc<dyn NativeFunction>> {
    vec![
        Rc::new(NativePrint),
        Rc::new(NativeLen),
        Rc::new(NativeFirst),
        Rc::new(NativeLast),
        Rc::new(NativeRest),
        Rc::new(NativePush),
    ]
}

fn check_argument_count(arguments: &[Value], expected: usize) -> Result<(), RuntimeErrorKind> {
    if arguments.len() != expected {
        return Err(RuntimeErrorKind::InvalidArgumentCount {
            actual: arguments.len(),
            expected,
        });
    }
    Ok(())
}

fn expect_array(name: &'static str, value: &Value) -> Result<Rc<Vec<Value>>, RuntimeErrorKind> {
    match value {
        Value::Array(elements) => Ok(elements.clone()),
        v => Err(RuntimeErrorKind::NonArrayArgument {
            name,
            actual: v.type_name(),
        }),
    }
}

/// Writes its arguments separated by spaces on a single line.
#[derive(Debug)]
pub struct NativePrint;

impl NativeFunction for NativePrint {
    fn get_name(&self) -> &'static str {
        "print"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let line = arguments
            .iter()
            .map(|argument| argument.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        context.writeln(&line);
        Ok(Value::Null)
    }
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        check_argument_count(&arguments, 1)?;
        match &arguments[0] {
            Value::String(v) => Ok(Value::Integer(v.chars().count() as i64)),
            Value::Array(elements) => Ok(Value::Integer(elements.len() as i64)),
            v => Err(RuntimeErrorKind::UnsupportedArgument {
                name: self.get_name(),
                actual: v.type_name(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct NativeFirst;

impl NativeFunction for NativeFirst {
    fn get_name(&self) -> &'static str {
        "first"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        check_argument_count(&arguments, 1)?;
        let elements = expect_array(self.get_name(), &arguments[0])?;
        Ok(elements.first().cloned().unwrap_or(Value::Null))
    }
}

#[derive(Debug)]
pub struct NativeLast;

impl NativeFunction for NativeLast {
    fn get_name(&self) -> &'static str {
        "last"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        check_argument_count(&arguments, 1)?;
        let elements = expect_array(self.get_name(), &arguments[0])?;
        Ok(elements.last().cloned().unwrap_or(Value::Null))
    }
}

/// Everything after the first element, or null for an empty array.
#[derive(Debug)]
pub struct NativeRest;

impl NativeFunction for NativeRest {
    fn get_name(&self) -> &'static str {
        "rest"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        check_argument_count(&arguments, 1)?;
        let elements = expect_array(self.get_name(), &arguments[0])?;
        match elements.split_first() {
            Some((_, rest)) => Ok(Value::Array(Rc::new(rest.to_vec()))),
            None => Ok(Value::Null),
        }
    }
}

/// Returns a new array with the value appended. The argument array is left untouched.
#[derive(Debug)]
pub struct NativePush;

impl NativeFunction for NativePush {
    fn get_name(&self) -> &'static str {
        "push"
    }

    fn call(
        &self,
        arguments: Vec<Value>,
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        check_argument_count(&arguments, 2)?;
        let elements = expect_array(self.get_name(), &arguments[0])?;
        let mut pushed = Vec::with_capacity(elements.len() + 1);
        pushed.extend(elements.iter().cloned());
        pushed.push(arguments[1].clone());
        Ok(Value::Array(Rc::new(pushed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::BufferedContext;

    fn call(native: &dyn NativeFunction, arguments: Vec<Value>) -> Result<Value, RuntimeErrorKind> {
        let mut context = BufferedContext::new();
        native.call(arguments, &mut context)
    }

    fn array(values: &[i64]) -> Value {
        Value::Array(Rc::new(values.iter().map(|v| Value::Integer(*v)).collect()))
    }

    #[test]
    fn print_joins_with_spaces() {
        let mut context = BufferedContext::new();
        let result = NativePrint
            .call(
                vec![Value::Integer(1), Value::String("a".into()), Value::Null],
                &mut context,
            )
            .unwrap();
        assert!(matches!(result, Value::Null));
        assert_eq!(context.into_data(), "1 a null\n");
    }

    #[test]
    fn len_counts_characters() {
        let result = call(&NativeLen, vec![Value::String("héllo".into())]).unwrap();
        assert!(result.is_equal(&Value::Integer(5)));
    }

    #[test]
    fn len_rejects_integers() {
        let error = call(&NativeLen, vec![Value::Integer(1)]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "argument to `len` not supported, got INTEGER"
        );
    }

    #[test]
    fn arity_is_checked() {
        let error = call(&NativePush, vec![array(&[1])]).unwrap_err();
        assert_eq!(error.to_string(), "wrong number of arguments. got=1, want=2");
    }

    #[test]
    fn first_and_last_of_empty_array_are_null() {
        assert!(matches!(call(&NativeFirst, vec![array(&[])]), Ok(Value::Null)));
        assert!(matches!(call(&NativeLast, vec![array(&[])]), Ok(Value::Null)));
    }

    #[test]
    fn rest_drops_the_first_element() {
        let result = call(&NativeRest, vec![array(&[1, 2, 3])]).unwrap();
        assert!(result.is_equal(&array(&[2, 3])));
        assert!(matches!(call(&NativeRest, vec![array(&[])]), Ok(Value::Null)));
    }

    #[test]
    fn push_leaves_the_original_untouched() {
        let original = array(&[1, 2]);
        let result = call(&NativePush, vec![original.clone(), Value::Integer(3)]).unwrap();
        assert!(result.is_equal(&array(&[1, 2, 3])));
        assert!(original.is_equal(&array(&[1, 2])));
    }

    #[test]
    fn non_array_arguments_are_named() {
        let error = call(&NativeFirst, vec![Value::Bool(true)]).unwrap_err();
        assert_eq!(error.to_string(), "argument to `first` must be ARRAY, got BOOLEAN");
    }
}
