//! Lexically-scoped binding store
//!
//! An environment is a local name→value map plus an optional link to
//! the enclosing environment. Lookups walk the chain outward; writes
//! always land in the local map, so assigning to a name bound in an
//! outer scope shadows it instead of updating it. Closures keep their
//! defining environment alive through the shared handle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// One scope's bindings, linked to its enclosing scope
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Create a root environment
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create an empty environment enclosed by `outer`
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Self {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Look up a name, walking the local map then the outer chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }

    /// Bind a name in the local scope, returning the stored value.
    ///
    /// This never walks outward: an existing outer binding of the same
    /// name is shadowed, not updated.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Value {
        self.store.insert(name.into(), value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(env: Environment) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(env))
    }

    #[test]
    fn test_get_and_set() {
        let mut env = Environment::new();
        assert_eq!(env.get("idadi"), None);
        env.set("idadi", Value::Int(5));
        assert_eq!(env.get("idadi"), Some(Value::Int(5)));
    }

    #[test]
    fn test_get_walks_outer_chain() {
        let outer = shared(Environment::new());
        outer.borrow_mut().set("jina", Value::string("asha"));
        let middle = shared(Environment::new_enclosed(Rc::clone(&outer)));
        let inner = Environment::new_enclosed(middle);
        assert_eq!(inner.get("jina"), Some(Value::string("asha")));
    }

    #[test]
    fn test_shadowing() {
        let outer = shared(Environment::new());
        outer.borrow_mut().set("idadi", Value::Int(1));
        let mut inner = Environment::new_enclosed(Rc::clone(&outer));
        inner.set("idadi", Value::Int(2));
        assert_eq!(inner.get("idadi"), Some(Value::Int(2)));
        assert_eq!(outer.borrow().get("idadi"), Some(Value::Int(1)));
    }

    #[test]
    fn test_set_does_not_walk_outward() {
        let outer = shared(Environment::new());
        outer.borrow_mut().set("idadi", Value::Int(1));
        let mut inner = Environment::new_enclosed(Rc::clone(&outer));
        // Writing through the inner scope must leave the outer binding
        // untouched
        inner.set("idadi", Value::Int(9));
        assert_eq!(outer.borrow().get("idadi"), Some(Value::Int(1)));
    }

    #[test]
    fn test_set_returns_the_value() {
        let mut env = Environment::new();
        let stored = env.set("x", Value::Int(3));
        assert_eq!(stored, Value::Int(3));
    }
}
