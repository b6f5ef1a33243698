//! Assembly of the canonical record from an event and its context

use super::config::MangoConfig;
use super::error::Result;
use super::log_context::LogContext;
use super::log_entry::{Attr, LogEvent};
use super::resolver::resolve;
use super::structured_entry::{Attributes, StructuredLog};
use super::timestamp::format_record_timestamp;

pub const UNKNOWN_OPERATION: &str = "unknownOperation";
pub const UNKNOWN_APPLICATION: &str = "unknownApplication";
pub const UNKNOWN_TYPE: &str = "unknownType";

/// Merge handler-scoped and call-scoped attributes
///
/// Later entries overwrite earlier ones, so call-scoped attributes win on a key
/// collision.
#[must_use]
pub fn merge_attrs(handler_attrs: &[Attr], call_attrs: &[Attr]) -> Attributes {
    handler_attrs
        .iter()
        .chain(call_attrs)
        .map(|attr| (attr.key.clone(), attr.value.clone()))
        .collect()
}

/// Prefix `key` with the open group path, if any
pub(crate) fn qualify(group: Option<&str>, key: &str) -> String {
    match group {
        Some(group) => format!("{}.{}", group, key),
        None => key.to_string(),
    }
}

/// Resolve the context and build the record for `event`
///
/// Call-scoped attributes are qualified with `group` before merging.
pub fn build_record(
    event: &LogEvent,
    ctx: &LogContext,
    handler_attrs: &[Attr],
    group: Option<&str>,
    policy: &MangoConfig,
) -> Result<StructuredLog> {
    let fields = resolve(ctx, policy)?;

    let call_attrs: Vec<Attr> = event
        .attrs
        .iter()
        .map(|attr| Attr {
            key: qualify(group, &attr.key),
            value: attr.value.clone(),
        })
        .collect();

    Ok(StructuredLog {
        timestamp: format_record_timestamp(&event.time),
        log_type: fields.log_type.unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        application: fields
            .application
            .unwrap_or_else(|| UNKNOWN_APPLICATION.to_string()),
        operation: fields
            .operation
            .unwrap_or_else(|| UNKNOWN_OPERATION.to_string()),
        correlation_id: fields.correlation_id.unwrap_or_default(),
        log_id: uuid::Uuid::new_v4().to_string(),
        level: event.level,
        message: event.message.clone(),
        attributes: merge_attrs(handler_attrs, &call_attrs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::ContextKey;
    use crate::core::log_level::LogLevel;
    use chrono::{Local, TimeZone};
    use serde_json::json;

    #[test]
    fn test_merge_call_scope_wins() {
        let merged = merge_attrs(
            &[Attr::new("a", "1")],
            &[Attr::new("a", "3"), Attr::new("b", "2")],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["a"], json!("3"));
        assert_eq!(merged["b"], json!("2"));
    }

    #[test]
    fn test_placeholders_when_not_strict() {
        let event = LogEvent::new(LogLevel::INFO, "hello");
        let record =
            build_record(&event, &LogContext::new(), &[], None, &MangoConfig::default()).unwrap();

        assert_eq!(record.operation, UNKNOWN_OPERATION);
        assert_eq!(record.application, UNKNOWN_APPLICATION);
        assert_eq!(record.log_type, UNKNOWN_TYPE);
        assert_eq!(record.correlation_id, "");
        assert!(uuid::Uuid::parse_str(&record.log_id).is_ok());
    }

    #[test]
    fn test_record_uses_event_time_and_context() {
        let time = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        let event = LogEvent::new(LogLevel::WARN, "hello").at(time);
        let ctx = LogContext::new()
            .with_key(ContextKey::Operation, "op1")
            .with_key(ContextKey::Application, "app");

        let record = build_record(&event, &ctx, &[], None, &MangoConfig::default()).unwrap();
        assert_eq!(record.timestamp, format_record_timestamp(&time));
        assert_eq!(record.operation, "op1");
        assert_eq!(record.application, "app");
        assert_eq!(record.level, LogLevel::WARN);
    }

    #[test]
    fn test_group_prefixes_call_attrs() {
        let event = LogEvent::new(LogLevel::INFO, "req").with_attr("status", 200);
        let record = build_record(
            &event,
            &LogContext::new(),
            &[Attr::new("service", "api")],
            Some("http.req"),
            &MangoConfig::default(),
        )
        .unwrap();

        assert_eq!(record.attributes["http.req.status"], json!(200));
        assert_eq!(record.attributes["service"], json!("api"));
    }

    #[test]
    fn test_log_ids_are_unique() {
        let event = LogEvent::new(LogLevel::INFO, "x");
        let policy = MangoConfig::default();
        let a = build_record(&event, &LogContext::new(), &[], None, &policy).unwrap();
        let b = build_record(&event, &LogContext::new(), &[], None, &policy).unwrap();
        assert_ne!(a.log_id, b.log_id);
    }
}
