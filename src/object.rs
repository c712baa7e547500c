//! Runtime values and lexical environments for the lpm evaluator.
//!
//! `Value` is the tagged union every expression evaluates to. Two variants
//! are signals rather than user-facing data: `ReturnValue` unwinds a block
//! to the nearest function-call boundary, and `Error` short-circuits any
//! further evaluation. Neither should ever reach a user except as the
//! top-level result the REPL prints.
//!
//! `Environment` is a chain of scopes. Lookup walks outward to the global
//! scope; insertion always targets the innermost scope. A `Function` value
//! keeps a handle to the environment that was live when the function
//! literal was evaluated, which is what gives closures their captured
//! bindings. Because a closure can end up stored back into the very
//! environment it captured (`variable f = procedimiento() { f(); };`),
//! environments are reference-counted (`Rc<RefCell<_>>`) rather than owned
//! outright. This crate does not attempt to break the resulting cycle,
//! matching the host language's own lack of a tracing collector for this
//! kind of structure (see DESIGN.md).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{Block, Identifier};

pub const INTEGER: &str = "INTEGER";
pub const BOOLEAN: &str = "BOOLEAN";
pub const STRING: &str = "STRING";
pub const NULL: &str = "NULL";
pub const RETURN: &str = "RETURN";
pub const ERROR: &str = "ERROR";
pub const FUNCTION: &str = "FUNCTION";
pub const BUILTIN: &str = "BUILTIN";

pub type BuiltinFn = fn(&[Value]) -> Value;

/// A runtime value produced by the evaluator.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    /// Unwinds to the nearest enclosing function call, where it is unwrapped.
    ReturnValue(Box<Value>),
    /// Short-circuits evaluation; propagated unchanged by every rule that
    /// receives one from a sub-evaluation.
    Error(String),
    Function {
        parameters: Vec<Identifier>,
        body: Block,
        env: Environment,
    },
    Builtin(BuiltinFn),
}

impl Value {
    /// The fixed type-name registry used in error messages and `type_name()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => INTEGER,
            Value::Boolean(_) => BOOLEAN,
            Value::String(_) => STRING,
            Value::Null => NULL,
            Value::ReturnValue(_) => RETURN,
            Value::Error(_) => ERROR,
            Value::Function { .. } => FUNCTION,
            Value::Builtin(_) => BUILTIN,
        }
    }

    /// Human-readable rendering used by the REPL and by `longitud`-style
    /// builtins that might want to stringify a value.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Boolean(true) => "verdadero".to_string(),
            Value::Boolean(false) => "falso".to_string(),
            Value::String(s) => s.clone(),
            Value::Null => "NULL".to_string(),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(message) => message.clone(),
            Value::Function {
                parameters, body, ..
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                format!("procedimiento({}) {{\n{}\n}}", params.join(", "), body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Truthiness per §4.3: only `FALSE` and `NULL` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.inspect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

struct EnvironmentInner {
    store: HashMap<String, Value>,
    outer: Option<Environment>,
}

/// A lexical scope: a name-to-value mapping plus an optional outer scope.
/// Cheap to clone (clones share the same underlying scope via `Rc`).
#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentInner>>);

impl Environment {
    pub fn new() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentInner {
            store: HashMap::new(),
            outer: None,
        })))
    }

    /// Creates a new innermost scope whose lookups fall back to `outer`.
    pub fn enclosed(outer: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentInner {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Walks outward through the scope chain looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.0.borrow();
        if let Some(value) = inner.store.get(name) {
            return Some(value.clone());
        }
        inner.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Binds `name` in this (innermost) scope. Re-declaring a name in the
    /// same scope overwrites it; this is the only mutation the language
    /// allows, and it never reaches into an outer scope.
    pub fn set(&self, name: String, value: Value) {
        self.0.borrow_mut().store.insert(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
