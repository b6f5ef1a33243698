//! Logger front end over a [`Handler`]

use super::config::LogConfig;
use super::error::Result;
use super::handler::Handler;
use super::log_context::LogContext;
use super::log_entry::{Attr, LogEvent};
use super::log_level::LogLevel;
use super::metrics::HandlerMetrics;

/// Level methods and derivations on top of a handler
///
/// # Example
///
/// ```
/// use mango_logger::appenders::{ConsoleStreams, MemoryWriter};
/// use mango_logger::core::{CliConfig, ContextKey, Handler, LogConfig, LogContext, Logger};
///
/// let out = MemoryWriter::new();
/// let config = LogConfig::new().with_output(true).with_console(CliConfig::new());
/// let handler = Handler::builder(config)
///     .console_streams(ConsoleStreams::new(out.clone(), MemoryWriter::new()))
///     .build()
///     .unwrap();
///
/// let logger = Logger::new(handler).with([("tenant", 42)]);
/// let ctx = LogContext::new().with_key(ContextKey::Operation, "checkout");
/// logger.info(&ctx, "order placed").unwrap();
///
/// assert!(out.contents().contains("\"operation\":\"checkout\""));
/// ```
#[derive(Debug, Clone)]
pub struct Logger {
    handler: Handler,
}

impl Logger {
    pub fn new(handler: Handler) -> Self {
        Self { handler }
    }

    /// Logger printing to stdout/stderr
    pub fn from_config(config: LogConfig) -> Result<Self> {
        Ok(Self::new(Handler::new(config)?))
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.handler.enabled(level)
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        self.handler.metrics()
    }

    pub fn log(
        &self,
        ctx: &LogContext,
        level: LogLevel,
        message: impl Into<serde_json::Value>,
    ) -> Result<()> {
        self.handler.handle(ctx, &LogEvent::new(level, message))
    }

    /// Log with call-scoped attributes
    pub fn log_with_attrs<I, A>(
        &self,
        ctx: &LogContext,
        level: LogLevel,
        message: impl Into<serde_json::Value>,
        attrs: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = A>,
        A: Into<Attr>,
    {
        let event = LogEvent::new(level, message).with_attrs(attrs);
        self.handler.handle(ctx, &event)
    }

    /// Log a prepared event
    pub fn log_event(&self, ctx: &LogContext, event: &LogEvent) -> Result<()> {
        self.handler.handle(ctx, event)
    }

    pub fn debug(&self, ctx: &LogContext, message: impl Into<serde_json::Value>) -> Result<()> {
        self.log(ctx, LogLevel::DEBUG, message)
    }

    pub fn info(&self, ctx: &LogContext, message: impl Into<serde_json::Value>) -> Result<()> {
        self.log(ctx, LogLevel::INFO, message)
    }

    pub fn warn(&self, ctx: &LogContext, message: impl Into<serde_json::Value>) -> Result<()> {
        self.log(ctx, LogLevel::WARN, message)
    }

    pub fn error(&self, ctx: &LogContext, message: impl Into<serde_json::Value>) -> Result<()> {
        self.log(ctx, LogLevel::ERROR, message)
    }

    /// Derived logger with extra handler-scoped attributes
    #[must_use]
    pub fn with<I, A>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attr>,
    {
        Self::new(self.handler.with_attrs(attrs))
    }

    /// Derived logger with `name` opened as a group
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        Self::new(self.handler.with_group(name))
    }

    pub fn flush(&self) -> Result<()> {
        self.handler.flush()
    }
}

impl From<Handler> for Logger {
    fn from(handler: Handler) -> Self {
        Self::new(handler)
    }
}
