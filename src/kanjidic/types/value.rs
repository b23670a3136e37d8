//! The recursive value type stored in a parsed entry.

use indexmap::IndexMap;
use std::fmt;

/// An ordered mapping from semantic key to value.
///
/// Iteration order is insertion order, which is the order in which the
/// attributes appeared on the source line.
pub type Fields = IndexMap<String, Value>;

/// A value held under a semantic key.
///
/// A key that occurs once holds a `Text` (or a `Map` for hierarchical
/// attributes such as dictionary references). A key that occurs again with
/// an incompatible shape is promoted to a `List`, and never demoted back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Flag(bool),
    List(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns every text value held directly by this value, in order.
    ///
    /// A `Text` yields itself, a `List` yields its text items. Flags and
    /// nested maps yield nothing.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Value::Text(s) => vec![s.as_str()],
            Value::List(items) => items.iter().filter_map(Value::as_text).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Flag(flag)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Map(fields)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Flag(b) => write!(f, "{}", b),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Map(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Builds a single-entry `Fields` map.
pub fn entry(key: impl Into<String>, value: impl Into<Value>) -> Fields {
    let mut fields = Fields::with_capacity(1);
    fields.insert(key.into(), value.into());
    fields
}
