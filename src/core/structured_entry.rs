//! The canonical structured record handed to every sink

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Merged attribute map carried by a record
pub type Attributes = HashMap<String, serde_json::Value>;

/// Log types accepted under strict mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogType {
    Business,
    Security,
    Performance,
}

impl LogType {
    /// The allow-list, in display order
    pub const ALL: [LogType; 3] = [LogType::Business, LogType::Security, LogType::Performance];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LogType::Business => "Business",
            LogType::Security => "Security",
            LogType::Performance => "Performance",
        }
    }

    /// Exact, case-sensitive match against the allow-list
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structure of every log entry as written to the sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredLog {
    /// Event time in the fixed record pattern
    #[serde(rename = "ts")]
    pub timestamp: String,

    /// One of Business, Security or Performance under strict mode
    #[serde(rename = "type")]
    pub log_type: String,

    pub application: String,

    /// The application's function or method, e.g. `checkout` or `user_registration`
    pub operation: String,

    /// Supplied by the caller or generated, relates events across systems
    #[serde(rename = "correlationid")]
    pub correlation_id: String,

    /// Unique per record
    #[serde(rename = "logId")]
    pub log_id: String,

    pub level: LogLevel,

    pub message: serde_json::Value,

    pub attributes: Attributes,
}

impl StructuredLog {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
