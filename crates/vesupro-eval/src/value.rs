//! Converted argument values and the invocation they form.

use vesupro_types::ResultShape;

/// An argument after conversion and the call-site cast.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint(u64),
    Int(i64),
    /// `float32` values are stored already rounded to single precision.
    Float(f64),
    /// Real and imaginary part; the imaginary part is always zero.
    Complex(f64, f64),
    Bool(bool),
    Str(String),
    /// Decoded aggregate payload.
    Aggregate(serde_json::Value),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// One typed argument of an [`Invocation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub position: usize,
    pub name: String,
    /// Declared type, i.e. the cast applied at the call site.
    pub type_name: String,
    pub value: Value,
}

/// A fully validated call, ready to hand to a [`crate::Receiver`].
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub receiver: String,
    pub method: String,
    pub arguments: Vec<Argument>,
    pub results: ResultShape,
}

impl Invocation {
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.arguments.get(position).map(|a| &a.value)
    }
}
