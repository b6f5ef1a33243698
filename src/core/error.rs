//! Error types for the logger system

use super::log_context::ContextKey;
use super::log_level::LogLevel;
use super::structured_entry::LogType;
use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Strict-mode policy rejected the event's context
    #[error(transparent)]
    StrictMode(#[from] StrictModeViolation),

    /// Record level outside debug, info, warn and error
    #[error("record level not one of debug, info, warn or error (got {level})")]
    UnrecognizedLevel { level: LogLevel },

    /// Configured syslog facility has no standard code
    #[error("facility level not valid: '{facility}'")]
    InvalidFacility { facility: String },

    /// No syslog transport on this platform
    #[error("syslog is not available on this platform")]
    SyslogUnavailable,

    /// Could not open the syslog connection
    #[error("error connecting to syslog: {source}")]
    SyslogConnect {
        #[source]
        source: std::io::Error,
    },

    /// Could not write to an open syslog connection
    #[error("error writing to syslog: {source}")]
    SyslogWrite {
        #[source]
        source: std::io::Error,
    },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },
}

impl LoggerError {
    /// Create an unrecognized level error
    pub fn unrecognized_level(level: LogLevel) -> Self {
        LoggerError::UnrecognizedLevel { level }
    }

    /// Create an invalid facility error
    pub fn invalid_facility(facility: impl Into<String>) -> Self {
        LoggerError::InvalidFacility {
            facility: facility.into(),
        }
    }

    pub fn syslog_connect(source: std::io::Error) -> Self {
        LoggerError::SyslogConnect { source }
    }

    pub fn syslog_write(source: std::io::Error) -> Self {
        LoggerError::SyslogWrite { source }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from strict-mode validation
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, LoggerError::StrictMode(_))
    }
}

/// One problem found with a required context field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    /// Absent, or present with a non-string value
    Missing(ContextKey),
    /// `type` holds a value outside the allow-list
    DisallowedType { value: String },
}

impl FieldViolation {
    pub fn key(&self) -> ContextKey {
        match self {
            FieldViolation::Missing(key) => *key,
            FieldViolation::DisallowedType { .. } => ContextKey::Type,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] required in context and not present (or wrong type - expected string)",
            self.key()
        )?;
        if let FieldViolation::DisallowedType { value } = self {
            let allowed = LogType::ALL
                .iter()
                .map(|t| format!("{:?}", t.as_str()))
                .collect::<Vec<_>>()
                .join(" ");
            write!(
                f,
                ". Current value [{}] is not in the allowed list: [{}]",
                value, allowed
            )?;
        }
        Ok(())
    }
}

/// Every violation found for a single event, together with the required set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictModeViolation {
    pub required: Vec<ContextKey>,
    pub violations: Vec<FieldViolation>,
}

impl StrictModeViolation {
    /// Keys that were missing or invalid
    pub fn offending_keys(&self) -> Vec<ContextKey> {
        self.violations.iter().map(FieldViolation::key).collect()
    }
}

impl fmt::Display for StrictModeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = self
            .required
            .iter()
            .map(ContextKey::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let violations = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(
            f,
            "[STRICT_MODE ON] without required context fields [{}] - {}",
            required, violations
        )
    }
}

impl std::error::Error for StrictModeViolation {}
