//! Value types for the promise core
//!
//! This module defines the runtime representation of the values that flow
//! through promises: settlement payloads, rejection reasons, handlers and
//! thenables. It also hosts the error factory that builds the tagged error
//! objects used as rejection payloads.
//!
//! Values are reference-managed: `Object` payloads live behind
//! `Rc<RefCell<_>>` and are released when the last handle drops, so
//! settlement values can be shared read-only between a promise and every
//! job that reacts to it.

use crate::error::ErrorKind;
use crate::promise::PromiseRef;
use crate::runtime::Runtime;
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Outcome of invoking a callable: the returned value, or the thrown one.
///
/// Handler failure is reified as `Err(payload)` at the invocation boundary
/// instead of unwinding; the drain loop converts it into a rejection of the
/// handler's derived promise.
pub type Completion = std::result::Result<Value, Value>;

/// Type alias for native function implementations
///
/// Native callables receive the runtime as an explicit shared context so
/// they can create promises, register reactions and settle promises while
/// the drain loop is running.
pub type NativeFn = Rc<dyn Fn(&mut Runtime, &[Value]) -> Completion>;

/// A script-level value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Object (includes errors, promises and native functions)
    Object(Rc<RefCell<Object>>),
}

impl Value {
    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the typeof string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // Historical quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::NativeFunction { .. } => "function",
                _ => "object",
            },
        }
    }

    /// Strict equality (===); objects compare by identity
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Create a new ordinary object value
    pub fn new_object() -> Value {
        Value::Object(Rc::new(RefCell::new(Object::new())))
    }

    /// Create a new error value (the error factory)
    ///
    /// The result is a tagged record exposing `kind` and `message`, also
    /// mirrored into `name`/`message` properties for handler inspection.
    /// Error values carry no special unwrapping behavior in the resolution
    /// procedure: they settle promises verbatim like any other value.
    pub fn new_error(kind: ErrorKind, message: &str) -> Value {
        let mut properties = HashMap::default();
        properties.insert("name".to_string(), Value::String(kind.to_string()));
        properties.insert("message".to_string(), Value::String(message.to_string()));
        Value::Object(Rc::new(RefCell::new(Object {
            kind: ObjectKind::Error {
                kind,
                message: message.to_string(),
            },
            properties,
        })))
    }

    /// Create a native function value
    pub fn native_function<F>(name: &str, func: F) -> Value
    where
        F: Fn(&mut Runtime, &[Value]) -> Completion + 'static,
    {
        Value::Object(Rc::new(RefCell::new(Object {
            kind: ObjectKind::NativeFunction {
                name: name.to_string(),
                func: Rc::new(func),
            },
            properties: HashMap::default(),
        })))
    }

    /// Wrap promise internals into a promise object value
    pub fn promise(internal: PromiseRef) -> Value {
        Value::Object(Rc::new(RefCell::new(Object {
            kind: ObjectKind::Promise(internal),
            properties: HashMap::default(),
        })))
    }

    /// Check if a value is callable
    pub fn is_callable(&self) -> bool {
        if let Value::Object(obj) = self {
            matches!(obj.borrow().kind, ObjectKind::NativeFunction { .. })
        } else {
            false
        }
    }

    /// Check if a value is a promise object
    pub fn is_promise(&self) -> bool {
        self.as_promise().is_some()
    }

    /// Check if a value is an error object
    pub fn is_error(&self) -> bool {
        if let Value::Object(obj) = self {
            matches!(obj.borrow().kind, ObjectKind::Error { .. })
        } else {
            false
        }
    }

    /// Get the promise internals behind a promise object
    pub fn as_promise(&self) -> Option<PromiseRef> {
        if let Value::Object(obj) = self {
            if let ObjectKind::Promise(internal) = &obj.borrow().kind {
                return Some(internal.clone());
            }
        }
        None
    }

    /// Get the native implementation behind a callable value
    pub fn native_fn(&self) -> Option<NativeFn> {
        if let Value::Object(obj) = self {
            if let ObjectKind::NativeFunction { func, .. } = &obj.borrow().kind {
                return Some(func.clone());
            }
        }
        None
    }

    /// Get the error kind of an error value
    pub fn error_kind(&self) -> Option<ErrorKind> {
        if let Value::Object(obj) = self {
            if let ObjectKind::Error { kind, .. } = &obj.borrow().kind {
                return Some(*kind);
            }
        }
        None
    }

    /// Get the error message of an error value
    pub fn error_message(&self) -> Option<String> {
        if let Value::Object(obj) = self {
            if let ObjectKind::Error { message, .. } = &obj.borrow().kind {
                return Some(message.clone());
            }
        }
        None
    }

    /// Get a property from an object value
    pub fn get_property(&self, key: &str) -> Option<Value> {
        if let Value::Object(obj) = self {
            obj.borrow().get_property(key)
        } else {
            None
        }
    }

    /// Set a property on an object value; returns false for non-objects
    pub fn set_property(&self, key: &str, value: Value) -> bool {
        if let Value::Object(obj) = self {
            obj.borrow_mut().set_property(key, value);
            true
        } else {
            false
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Ordinary => write!(f, "{{...}}"),
                    ObjectKind::Error { kind, message } => write!(f, "{}: {}", kind, message),
                    ObjectKind::NativeFunction { name, .. } => write!(f, "[Native: {}]", name),
                    ObjectKind::Promise(internal) => {
                        write!(f, "[Promise: {:?}]", internal.borrow().state())
                    }
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Ordinary => write!(f, "[object Object]"),
                    ObjectKind::Error { kind, message } => write!(f, "{}: {}", kind, message),
                    ObjectKind::NativeFunction { name, .. } => {
                        write!(f, "function {}() {{ [native code] }}", name)
                    }
                    ObjectKind::Promise(_) => write!(f, "[object Promise]"),
                }
            }
        }
    }
}

/// A heap-allocated object
#[derive(Clone)]
pub struct Object {
    /// Object kind
    pub kind: ObjectKind,
    /// Properties
    pub properties: HashMap<String, Value>,
}

impl Object {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            kind: ObjectKind::Ordinary,
            properties: HashMap::default(),
        }
    }

    /// Get an own property
    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.properties.get(key).cloned()
    }

    /// Set an own property
    pub fn set_property(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// Object kind
#[derive(Clone)]
pub enum ObjectKind {
    /// Plain object with only properties
    Ordinary,
    /// Error object with a kind tag and message
    Error {
        /// Script-level error kind
        kind: ErrorKind,
        /// Human-readable message
        message: String,
    },
    /// Native (host) function
    NativeFunction {
        /// Function name for diagnostics
        name: String,
        /// The native implementation
        func: NativeFn,
    },
    /// Promise object wrapping shared promise internals
    Promise(PromiseRef),
}
