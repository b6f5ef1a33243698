//! # Mango Logger
//!
//! A structured logging handler that turns each event into one canonical JSON
//! record and fans it out to the console, a rotating file and syslog.
//!
//! ## Features
//!
//! - **Context Fields**: operation, application, type and correlation id are
//!   read from a per-call [`LogContext`], with an optional strict mode
//! - **Multiple Sinks**: console with jq-style formatting, size-rotating file,
//!   local syslog
//! - **Thread Safe**: handlers are cheap to derive and share across threads
//!
//! ## Example
//!
//! ```
//! use mango_logger::prelude::*;
//!
//! let config = LogConfig::new()
//!     .with_output(true)
//!     .with_strict(true)
//!     .with_console(CliConfig::new().with_friendly(true));
//! let logger = Logger::from_config(config).unwrap();
//!
//! let ctx = LogContext::new()
//!     .with_key(ContextKey::Type, "Business")
//!     .with_key(ContextKey::Application, "shop")
//!     .with_key(ContextKey::Operation, "checkout");
//!
//! logger.info(&ctx, "order placed").unwrap();
//! assert!(logger.info(&LogContext::new(), "no context").is_err());
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, ConsoleStreams, MemoryWriter, RotatingFileAppender, SyslogAppender,
        SyslogTransport,
    };
    pub use crate::core::{
        Appender, Attr, CliConfig, ContextKey, FailurePolicy, FieldValue, FileOutputConfig,
        Handler, HandlerBuilder, HandlerMetrics, LogConfig, LogContext, LogEvent, LogLevel,
        LogType, Logger, LoggerError, Result, StructuredLog,
    };
}

pub use appenders::{ConsoleAppender, RotatingFileAppender, SyslogAppender};
pub use core::{
    Appender, Attr, CliConfig, ContextKey, FailurePolicy, FieldValue, FileOutputConfig, Handler,
    HandlerBuilder, HandlerMetrics, LogConfig, LogContext, LogEvent, LogLevel, LogType, Logger,
    LoggerError, Result, StructuredLog,
};
