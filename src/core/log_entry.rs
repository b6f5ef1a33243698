//! Raw log event and attribute types

use super::error::Result;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::Serialize;

/// A single key/value attribute attached to a handler or an event
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: serde_json::Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> From<(K, V)> for Attr {
    fn from((key, value): (K, V)) -> Self {
        Attr::new(key, value)
    }
}

/// An event as handed to the handler, before enrichment
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub time: DateTime<Local>,
    pub level: LogLevel,
    pub message: serde_json::Value,
    pub attrs: Vec<Attr>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<serde_json::Value>) -> Self {
        Self {
            time: Local::now(),
            level,
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    /// Build an event whose message is any serializable value
    ///
    /// # Errors
    ///
    /// Returns `JsonError` if the message cannot be represented as JSON
    pub fn from_serializable<T: Serialize + ?Sized>(level: LogLevel, message: &T) -> Result<Self> {
        Ok(Self::new(level, serde_json::to_value(message)?))
    }

    /// Override the event time
    #[must_use]
    pub fn at(mut self, time: DateTime<Local>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_attr(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    #[must_use]
    pub fn with_attrs<I, A>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attr>,
    {
        self.attrs.extend(attrs.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_attrs_keep_call_order() {
        let event = LogEvent::new(LogLevel::INFO, "hello")
            .with_attr("a", "1")
            .with_attrs([("b", json!(2)), ("a", json!("3"))]);

        let keys: Vec<&str> = event.attrs.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "a"]);
        assert_eq!(event.message, json!("hello"));
    }

    #[test]
    fn test_serializable_message() {
        #[derive(Serialize)]
        struct Order {
            id: u32,
            total: f64,
        }

        let order = Order { id: 7, total: 9.5 };
        let event = LogEvent::from_serializable(LogLevel::WARN, &order).unwrap();
        assert_eq!(event.message, json!({"id": 7, "total": 9.5}));
        assert_eq!(event.level, LogLevel::WARN);
    }
}
