//! Logging macros for ergonomic log message formatting.
//!
//! Each macro takes the logger, the log context and `format!`-style
//! arguments, and evaluates to the `Result` of the call.
//!
//! # Examples
//!
//! ```
//! use mango_logger::prelude::*;
//! use mango_logger::info;
//!
//! let logger = Logger::from_config(LogConfig::new()).unwrap();
//! let ctx = LogContext::new().with_key(ContextKey::Operation, "startup");
//!
//! let port = 8080;
//! info!(logger, &ctx, "Server listening on port {}", port).unwrap();
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use mango_logger::prelude::*;
/// # let logger = Logger::from_config(LogConfig::new()).unwrap();
/// # let ctx = LogContext::new();
/// use mango_logger::log;
/// log!(logger, &ctx, LogLevel::ERROR, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $ctx:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($ctx, $level, format!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use mango_logger::prelude::*;
/// # let logger = Logger::from_config(LogConfig::new()).unwrap();
/// # let ctx = LogContext::new();
/// use mango_logger::debug;
/// debug!(logger, &ctx, "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::DEBUG, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::INFO, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::WARN, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use mango_logger::prelude::*;
/// # let logger = Logger::from_config(LogConfig::new()).unwrap();
/// # let ctx = LogContext::new();
/// use mango_logger::error;
/// let error_msg = "Connection timeout";
/// error!(logger, &ctx, "Database error: {}", error_msg).unwrap();
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::ERROR, $($arg)+)
    };
}
