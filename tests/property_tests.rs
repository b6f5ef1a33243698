//! Property-based tests for mango_logger using proptest

use chrono::{FixedOffset, TimeZone, Utc};
use mango_logger::appenders::{priority, SyslogFacility};
use mango_logger::core::{
    format_record_timestamp, merge_attrs, parse_record_timestamp, resolve, Attr, ContextKey,
    LogContext, LoggerError, MangoConfig,
};
use mango_logger::prelude::*;
use proptest::prelude::*;
use std::collections::HashMap;

fn recognized_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::DEBUG),
        Just(LogLevel::INFO),
        Just(LogLevel::WARN),
        Just(LogLevel::ERROR),
    ]
}

fn attrs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-d]", "[a-z0-9]{0,6}"), 0..8)
}

fn to_attrs(pairs: &[(String, String)]) -> Vec<Attr> {
    pairs
        .iter()
        .map(|(k, v)| Attr::new(k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// Attribute Merge Tests
// ============================================================================

proptest! {
    /// Every key from either scope survives, and the last call-scoped value wins
    #[test]
    fn test_merge_last_writer_wins(handler in attrs(), call in attrs()) {
        let merged = merge_attrs(&to_attrs(&handler), &to_attrs(&call));

        let mut expected: HashMap<String, String> = HashMap::new();
        for (k, v) in handler.iter().chain(call.iter()) {
            expected.insert(k.clone(), v.clone());
        }

        prop_assert_eq!(merged.len(), expected.len());
        for (k, v) in expected {
            prop_assert_eq!(merged[&k].as_str(), Some(v.as_str()));
        }
    }
}

// ============================================================================
// Syslog Priority Tests
// ============================================================================

proptest! {
    /// Priority is always the facility code OR'd with the severity
    #[test]
    fn test_priority_is_facility_or_severity(
        index in 0usize..19,
        level in recognized_level(),
    ) {
        let facility = SyslogFacility::ALL[index];
        let p = priority(facility.as_str(), level).unwrap();

        let severity = match level {
            LogLevel::DEBUG => 7,
            LogLevel::INFO => 6,
            LogLevel::WARN => 4,
            _ => 3,
        };
        prop_assert_eq!(p.code(), facility.code() | severity);
        prop_assert_eq!(p.code() >> 3, facility.code() >> 3);
    }

    /// Names outside the facility table are rejected
    #[test]
    fn test_unknown_facility_rejected(name in "[a-z]{1,8}", level in recognized_level()) {
        prop_assume!(SyslogFacility::ALL.iter().all(|f| f.as_str() != name));
        let err = priority(&name, level).unwrap_err();
        prop_assert!(matches!(err, LoggerError::InvalidFacility { .. }), "expected InvalidFacility, got {:?}", err);
    }

    /// Codes outside the four levels are rejected before the facility is looked at
    #[test]
    fn test_unknown_level_rejected(code in any::<i32>()) {
        let level = LogLevel::new(code);
        prop_assume!(!level.is_recognized());
        let err = priority("not-a-facility", level).unwrap_err();
        prop_assert!(matches!(err, LoggerError::UnrecognizedLevel { .. }), "expected UnrecognizedLevel, got {:?}", err);
    }
}

/// Every facility and level pair, checked without sampling
#[test]
fn test_priority_table_exhaustive() {
    for facility in SyslogFacility::ALL {
        for level in LogLevel::RECOGNIZED {
            let severity = match level {
                LogLevel::DEBUG => 7,
                LogLevel::INFO => 6,
                LogLevel::WARN => 4,
                _ => 3,
            };
            let p = priority(facility.as_str(), level).unwrap();
            assert_eq!(p.code(), facility.code() | severity, "{} {}", facility, level);
        }
    }
}

// ============================================================================
// Timestamp Tests
// ============================================================================

proptest! {
    /// Fraction has at most three digits, no trailing zero, and parses back
    #[test]
    fn test_timestamp_pattern(
        secs in 0i64..4_102_444_800,
        nanos in 0u32..1_000_000_000,
        offset_minutes in -720i32..=840,
    ) {
        let utc = Utc.timestamp_opt(secs, nanos).unwrap();
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let local = utc.with_timezone(&offset);
        let formatted = format_record_timestamp(&local);

        prop_assert_eq!(&formatted[4..5], "-");
        prop_assert_eq!(&formatted[10..11], "T");
        if let Some(dot) = formatted.find('.') {
            let fraction: String = formatted[dot + 1..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            prop_assert!(!fraction.is_empty() && fraction.len() <= 3);
            prop_assert!(!fraction.ends_with('0'));
        }
        if offset_minutes == 0 {
            prop_assert!(formatted.ends_with('Z'));
        } else {
            let zone = &formatted[formatted.len() - 5..];
            prop_assert!(zone.starts_with('+') || zone.starts_with('-'));
        }

        let parsed = parse_record_timestamp(&formatted).unwrap();
        prop_assert_eq!(parsed.timestamp_millis(), utc.timestamp_millis());
    }
}

// ============================================================================
// Resolver Tests
// ============================================================================

proptest! {
    /// Without strict mode any string values are copied as-is
    #[test]
    fn test_non_strict_copies_strings(
        op in "[ -~]{0,12}",
        app in "[ -~]{0,12}",
        kind in "[ -~]{0,12}",
    ) {
        let ctx = LogContext::new()
            .with_key(ContextKey::Operation, op.as_str())
            .with_key(ContextKey::Application, app.as_str())
            .with_key(ContextKey::Type, kind.as_str());

        let fields = resolve(&ctx, &MangoConfig::default()).unwrap();
        prop_assert_eq!(fields.operation, Some(op));
        prop_assert_eq!(fields.application, Some(app));
        prop_assert_eq!(fields.log_type, Some(kind));
    }
}
