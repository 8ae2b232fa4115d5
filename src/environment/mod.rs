mod native;

use crate::value::Value;
use compact_str::{CompactString, ToCompactString};
pub use native::{
    native_functions, NativeFirst, NativeLast, NativeLen, NativePrint, NativePush, NativeRest,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A scope in the chain of lexical scopes. Cloning shares the same scope.
#[derive(Debug, Clone)]
pub struct SharedEnvironment {
    inner: Rc<RefCell<EnvironmentImpl>>,
}

#[derive(Debug)]
struct EnvironmentImpl {
    values: HashMap<CompactString, Value>,
    parent: Option<SharedEnvironment>,
}

impl SharedEnvironment {
    /// Creates a global scope holding every builtin.
    pub fn new() -> Self {
        let globals = native_functions()
            .into_iter()
            .map(|native| (native.get_name().to_compact_string(), Value::NativeFunction(native)))
            .collect();

        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: globals,
                parent: None,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Looks the name up in this scope, then in each enclosing scope in turn.
    pub fn access(&self, name: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        match inner.values.get(name) {
            Some(value) => Some(value.clone()),
            None => inner.parent.as_ref()?.access(name),
        }
    }

    /// Binds the name in this scope only. Enclosing scopes are never written to, even if they
    /// already bind the same name.
    pub fn declare(&self, name: &str, value: Value) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_compact_string(), value);
    }
}

impl Default for SharedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outwards() {
        let globals = SharedEnvironment::new();
        globals.declare("x", Value::Integer(1));
        let inner = globals.new_scope();
        assert!(inner.access("x").unwrap().is_equal(&Value::Integer(1)));
        assert!(inner.access("missing").is_none());
    }

    #[test]
    fn declare_shadows_without_touching_outer_scope() {
        let globals = SharedEnvironment::new();
        globals.declare("x", Value::Integer(1));
        let inner = globals.new_scope();
        inner.declare("x", Value::Integer(2));
        assert!(inner.access("x").unwrap().is_equal(&Value::Integer(2)));
        assert!(globals.access("x").unwrap().is_equal(&Value::Integer(1)));
    }

    #[test]
    fn later_outer_bindings_are_visible() {
        let globals = SharedEnvironment::new();
        let inner = globals.new_scope();
        globals.declare("late", Value::Bool(true));
        assert!(inner.access("late").is_some());
    }

    #[test]
    fn builtins_live_in_the_global_scope() {
        let globals = SharedEnvironment::new();
        for name in ["print", "len", "first", "last", "rest", "push"] {
            assert!(matches!(
                globals.access(name),
                Some(Value::NativeFunction(_))
            ));
        }
    }
}
