//! Ambient context for log events
//!
//! This module provides:
//! - `ContextKey`: the well-known keys the resolver looks for
//! - `FieldValue`: value type stored in the context
//! - `LogContext`: the key-value lookup passed alongside each event

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Contract fields expected in the context for logging purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKey {
    #[serde(rename = "correlationid")]
    CorrelationId,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "application")]
    Application,
    #[serde(rename = "operation")]
    Operation,
}

impl ContextKey {
    /// Wire name of the key, as looked up in a `LogContext`
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContextKey::CorrelationId => "correlationid",
            ContextKey::Type => "type",
            ContextKey::Application => "application",
            ContextKey::Operation => "operation",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type for context fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Borrow the value as a string, if it is one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

macro_rules! int_field_value {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Int(i64::from(v))
            }
        })*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// Ambient key-value lookup handed to the handler with every event
///
/// # Example
///
/// ```
/// use mango_logger::core::{ContextKey, LogContext};
///
/// let ctx = LogContext::new()
///     .with_key(ContextKey::Operation, "checkout")
///     .with_key(ContextKey::Application, "shop")
///     .with_field("tenant", 42);
///
/// assert_eq!(ctx.get_str(ContextKey::Operation), Some("checkout"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogContext {
    fields: HashMap<String, FieldValue>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add one of the well-known fields
    pub fn with_key<V: Into<FieldValue>>(self, key: ContextKey, value: V) -> Self {
        self.with_field(key.as_str(), value)
    }

    /// Set a well-known field in place
    pub fn set<V: Into<FieldValue>>(&mut self, key: ContextKey, value: V) {
        self.fields.insert(key.as_str().to_owned(), value.into());
    }

    /// Look up a well-known field
    pub fn get(&self, key: ContextKey) -> Option<&FieldValue> {
        self.fields.get(key.as_str())
    }

    /// Look up a well-known field, only if it holds a string
    pub fn get_str(&self, key: ContextKey) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Look up any field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_well_known_lookup() {
        let ctx = LogContext::new()
            .with_key(ContextKey::Type, "Business")
            .with_field("correlationid", 12);

        assert_eq!(ctx.get_str(ContextKey::Type), Some("Business"));
        // present but not a string
        assert_eq!(ctx.get(ContextKey::CorrelationId), Some(&FieldValue::Int(12)));
        assert_eq!(ctx.get_str(ContextKey::CorrelationId), None);
        assert_eq!(ctx.get(ContextKey::Operation), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(ContextKey::CorrelationId.as_str(), "correlationid");
        assert_eq!(ContextKey::Type.to_string(), "type");
    }

    #[test]
    fn test_set_overwrites() {
        let mut ctx = LogContext::new().with_key(ContextKey::Application, "old");
        ctx.set(ContextKey::Application, "new");
        ctx.set(ContextKey::CorrelationId, None::<&str>);

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get_str(ContextKey::Application), Some("new"));
        assert_eq!(ctx.field("correlationid"), Some(&FieldValue::Null));
    }
}
