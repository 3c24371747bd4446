//! Untyped MessagePack values.

mod raw;

use std::fmt;

pub use raw::{RawKind, RawValue};

/// A decoded MessagePack value of no particular application type.
///
/// Integers that fit `i64` are always [`Value::Integer`]; [`Value::Uint64`]
/// only holds values above `i64::MAX`. The `From` conversions keep to that.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Raw(RawValue),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a u64, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(i) => u64::try_from(*i).ok(),
            Self::Uint64(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&RawValue> {
        match self {
            Self::Raw(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the text of a raw value, if it is well-formed UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_raw().and_then(|r| r.as_str().ok())
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up the first entry whose key is the given text.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Self::Integer(i),
            Err(_) => Self::Uint64(u),
        }
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Raw(RawValue::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Raw(RawValue::from(s))
    }
}

impl From<RawValue> for Value {
    fn from(r: RawValue) -> Self {
        Self::Raw(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Vec<(Value, Value)>> for Value {
    fn from(m: Vec<(Value, Value)>) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Nil, Into::into)
    }
}

/// JSON-like rendering. Never fails on malformed text; see [`RawValue`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Uint64(u) => write!(f, "{u}"),
            // NaN and infinities have no JSON form.
            Self::Float(v) if !v.is_finite() => write!(f, "null"),
            Self::Double(v) if !v.is_finite() => write!(f, "null"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Raw(r) => write!(f, "{r}"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
