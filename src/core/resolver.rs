//! Context field resolution and strict-mode validation

use super::config::MangoConfig;
use super::error::{FieldViolation, Result, StrictModeViolation};
use super::log_context::{ContextKey, LogContext};
use super::structured_entry::LogType;

/// Fields pulled out of the context for a single event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub operation: Option<String>,
    pub application: Option<String>,
    pub log_type: Option<String>,
    pub correlation_id: Option<String>,
}

/// Fields a context must carry under the given policy
///
/// Always `type`, `application` and `operation`; `correlationid` is added when
/// correlation-strict is on.
#[must_use]
pub fn required_fields(policy: &MangoConfig) -> Vec<ContextKey> {
    let mut required = vec![ContextKey::Type, ContextKey::Application, ContextKey::Operation];
    if policy.correlation_id.strict {
        required.push(ContextKey::CorrelationId);
    }
    required
}

/// Read the well-known fields from `ctx`, checking them against `policy`
///
/// Every problem found is collected into one [`StrictModeViolation`].
///
/// # Example
///
/// ```
/// use mango_logger::core::{resolve, ContextKey, LogContext, MangoConfig};
///
/// let policy = MangoConfig { strict: true, ..MangoConfig::default() };
/// let ctx = LogContext::new().with_key(ContextKey::Type, "Business");
///
/// let err = resolve(&ctx, &policy).unwrap_err();
/// assert!(err.is_validation());
/// ```
pub fn resolve(ctx: &LogContext, policy: &MangoConfig) -> Result<ResolvedFields> {
    let mut violations = Vec::new();
    let mut fields = ResolvedFields::default();

    for key in [ContextKey::Type, ContextKey::Application, ContextKey::Operation] {
        let value = ctx.get_str(key).map(str::to_string);
        match (&value, key) {
            (None, _) if policy.strict => violations.push(FieldViolation::Missing(key)),
            (Some(name), ContextKey::Type)
                if policy.strict && LogType::from_name(name).is_none() =>
            {
                violations.push(FieldViolation::DisallowedType {
                    value: name.clone(),
                });
            }
            _ => {}
        }
        match key {
            ContextKey::Type => fields.log_type = value,
            ContextKey::Application => fields.application = value,
            _ => fields.operation = value,
        }
    }

    fields.correlation_id = match ctx.get_str(ContextKey::CorrelationId) {
        Some(id) if !id.is_empty() => Some(id.to_string()),
        _ if policy.correlation_id.auto_generate => Some(uuid::Uuid::new_v4().to_string()),
        _ if policy.correlation_id.strict => {
            violations.push(FieldViolation::Missing(ContextKey::CorrelationId));
            None
        }
        _ => None,
    };

    if violations.is_empty() {
        Ok(fields)
    } else {
        Err(StrictModeViolation {
            required: required_fields(policy),
            violations,
        }
        .into())
    }
}
