//! Log level definitions
//!
//! Levels are integer codes on the record wire scale, so a code outside the
//! four recognized ones can still travel through the pipeline and be rejected
//! by the sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level code; the default is `INFO` (code 0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(i32);

impl LogLevel {
    pub const DEBUG: LogLevel = LogLevel(-4);
    pub const INFO: LogLevel = LogLevel(0);
    pub const WARN: LogLevel = LogLevel(4);
    pub const ERROR: LogLevel = LogLevel(8);

    /// All recognized levels in ascending order
    pub const RECOGNIZED: [LogLevel; 4] = [
        LogLevel::DEBUG,
        LogLevel::INFO,
        LogLevel::WARN,
        LogLevel::ERROR,
    ];

    /// Build a level from its raw wire code
    #[must_use]
    pub const fn new(code: i32) -> Self {
        LogLevel(code)
    }

    #[must_use]
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Whether this is one of debug, info, warn or error
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        Self::RECOGNIZED.contains(self)
    }

    /// Upper-case name for recognized levels
    pub fn to_str(&self) -> Option<&'static str> {
        match *self {
            LogLevel::DEBUG => Some("DEBUG"),
            LogLevel::INFO => Some("INFO"),
            LogLevel::WARN => Some("WARN"),
            LogLevel::ERROR => Some("ERROR"),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "LEVEL({})", self.0),
        }
    }
}

impl From<i32> for LogLevel {
    fn from(code: i32) -> Self {
        LogLevel(code)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::DEBUG),
            "INFO" => Ok(LogLevel::INFO),
            "WARN" | "WARNING" => Ok(LogLevel::WARN),
            "ERROR" => Ok(LogLevel::ERROR),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
