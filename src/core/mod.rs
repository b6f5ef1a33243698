//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record_builder;
pub mod resolver;
pub mod structured_entry;
pub mod timestamp;

pub use appender::Appender;
pub use config::{
    CliConfig, CorrelationIdConfig, FailurePolicy, FileOutputConfig, LogConfig, MangoConfig,
    OutConfig, SyslogConfig, DEFAULT_FRIENDLY_FORMAT, DEFAULT_VERBOSE_FORMAT,
};
pub use error::{FieldViolation, LoggerError, Result, StrictModeViolation};
pub use filter::{format_with_filter, Filter};
pub use handler::{Handler, HandlerBuilder};
pub use log_context::{ContextKey, FieldValue, LogContext};
pub use log_entry::{Attr, LogEvent};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::HandlerMetrics;
pub use record_builder::{
    build_record, merge_attrs, UNKNOWN_APPLICATION, UNKNOWN_OPERATION, UNKNOWN_TYPE,
};
pub use resolver::{required_fields, resolve, ResolvedFields};
pub use structured_entry::{Attributes, LogType, StructuredLog};
pub use timestamp::{format_record_timestamp, parse_record_timestamp};
