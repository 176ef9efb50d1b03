//! ActionScript value representation
//!
//! A `Value` is a tagged union over the AVM1 primitive space (undefined,
//! null, boolean, IEEE-754 double, string) plus a shared handle to an
//! object. Strings are immutable and cheaply cloneable; object handles
//! compare by identity.

use std::fmt;
use std::rc::Rc;

use crate::runtime::ObjectRef;
use crate::util::dtoa;

/// Discriminant of a [`Value`], used by the version-gated coercion tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
}

/// ActionScript value
///
/// Numbers follow IEEE-754 double semantics including NaN and signed
/// infinities. The `Object` variant is a non-owning handle; object lifetime
/// is managed by the reference-counted pool behind [`ObjectRef`].
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectRef),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create a number value.
    #[inline]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Get the kind discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Check if this is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is null or undefined
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if this is an object handle
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if this is a primitive (anything but an object handle)
    #[inline]
    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    /// Get the boolean payload, if this is a boolean
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number payload, if this is a number
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string payload, if this is a string
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the object handle, if this is an object
    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

/// Equality is identity-like: objects compare by handle, numbers by IEEE
/// `==` (so `NaN != NaN`), strings by content.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Object(o) => write!(f, "{:?}", o),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", dtoa::number_to_string(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(o) => {
                if o.is_function() {
                    write!(f, "[type Function]")
                } else {
                    write!(f, "[type Object]")
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}
