//! Sink dispatcher
//!
//! A [`Handler`] owns the configuration, the handler-scoped attributes and the
//! shared sinks. Every event goes through the same steps: check that output is
//! enabled, resolve and validate the context, build the record, serialize it
//! once, then hand the JSON line to console, file and syslog in that order.

use super::appender::Appender;
use super::config::{FailurePolicy, LogConfig};
use super::error::{LoggerError, Result};
use super::log_context::LogContext;
use super::log_entry::{Attr, LogEvent};
use super::log_level::LogLevel;
use super::metrics::HandlerMetrics;
use super::record_builder::{build_record, qualify};
use crate::appenders::{
    default_transport, ConsoleAppender, ConsoleStreams, Priority, RotatingFileAppender,
    SyslogAppender, SyslogTransport,
};
use std::fmt;
use std::sync::Arc;

const OUTPUT_DISABLED_NOTICE: &str = "No logging enabled! Check config.out.enabled.";
const NO_SINK_NOTICE: &str = "Effectively no logging enabled! The config.out.file.enabled, \
     config.out.cli.enabled and config.out.syslog.facility flags are all false.";

/// The enabled sinks, shared by every handler derived from the same builder
#[derive(Clone)]
struct SinkSet {
    console: Option<Arc<ConsoleAppender>>,
    file: Option<Arc<RotatingFileAppender>>,
    syslog: Option<Arc<SyslogAppender>>,
}

impl SinkSet {
    /// Enabled sinks in dispatch order
    fn iter(&self) -> impl Iterator<Item = &dyn Appender> {
        let console = self.console.as_deref().map(|a| a as &dyn Appender);
        let file = self.file.as_deref().map(|a| a as &dyn Appender);
        let syslog = self.syslog.as_deref().map(|a| a as &dyn Appender);
        console.into_iter().chain(file).chain(syslog)
    }
}

/// Builder for constructing a Handler with a fluent API
///
/// # Example
///
/// ```
/// use mango_logger::appenders::{ConsoleStreams, MemoryWriter, UnavailableSyslogTransport};
/// use mango_logger::core::{CliConfig, Handler, LogConfig};
/// use std::sync::Arc;
///
/// let config = LogConfig::new()
///     .with_output(true)
///     .with_console(CliConfig::new().with_friendly(true));
///
/// let handler = Handler::builder(config)
///     .console_streams(ConsoleStreams::new(MemoryWriter::new(), MemoryWriter::new()))
///     .syslog_transport(Arc::new(UnavailableSyslogTransport))
///     .build()
///     .unwrap();
/// ```
pub struct HandlerBuilder {
    config: LogConfig,
    streams: Option<ConsoleStreams>,
    transport: Option<Arc<dyn SyslogTransport>>,
    metrics: Option<Arc<HandlerMetrics>>,
}

impl HandlerBuilder {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            streams: None,
            transport: None,
            metrics: None,
        }
    }

    /// Print to `streams` instead of stdout/stderr
    #[must_use = "builder methods return a new value"]
    pub fn console_streams(mut self, streams: ConsoleStreams) -> Self {
        self.streams = Some(streams);
        self
    }

    /// Send syslog records through `transport` instead of the platform default
    #[must_use = "builder methods return a new value"]
    pub fn syslog_transport(mut self, transport: Arc<dyn SyslogTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Count into an existing metrics instance
    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<HandlerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the Handler
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a console format expression does not
    /// parse
    pub fn build(self) -> Result<Handler> {
        let mut config = self.config;
        config.out.cli.apply_default_formats();

        let streams = self.streams.unwrap_or_else(ConsoleStreams::stdio);
        let metrics = self.metrics.unwrap_or_default();
        let out = &config.out;

        let console = if out.cli.enabled {
            Some(Arc::new(ConsoleAppender::new(
                &out.cli,
                streams.clone(),
                Arc::clone(&metrics),
            )?))
        } else {
            None
        };
        let file = out
            .file
            .enabled
            .then(|| Arc::new(RotatingFileAppender::from_config(&out.file)));
        let syslog = out.syslog_enabled().then(|| {
            Arc::new(SyslogAppender::new(
                out.syslog.facility.clone(),
                self.transport.unwrap_or_else(default_transport),
            ))
        });

        Ok(Handler {
            config: Arc::new(config),
            attrs: Vec::new(),
            group: None,
            sinks: SinkSet {
                console,
                file,
                syslog,
            },
            streams,
            metrics,
        })
    }
}

/// Structured log handler
///
/// Cloning, [`with_attrs`](Handler::with_attrs) and
/// [`with_group`](Handler::with_group) produce independent handlers that share
/// configuration, sinks and metrics.
#[derive(Clone)]
pub struct Handler {
    config: Arc<LogConfig>,
    attrs: Vec<Attr>,
    group: Option<String>,
    sinks: SinkSet,
    streams: ConsoleStreams,
    metrics: Arc<HandlerMetrics>,
}

impl Handler {
    /// Handler printing to stdout/stderr with the platform syslog transport
    pub fn new(config: LogConfig) -> Result<Self> {
        HandlerBuilder::new(config).build()
    }

    #[must_use]
    pub fn builder(config: LogConfig) -> HandlerBuilder {
        HandlerBuilder::new(config)
    }

    /// Replace the syslog transport, keeping every other sink
    #[must_use]
    pub fn with_syslog_transport(mut self, transport: Arc<dyn SyslogTransport>) -> Self {
        if let Some(current) = &self.sinks.syslog {
            self.sinks.syslog = Some(Arc::new(SyslogAppender::new(
                current.facility().to_string(),
                transport,
            )));
        }
        self
    }

    /// Whether `level` is one of debug, info, warn and error
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.is_recognized()
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Handler-scoped attributes, keys already qualified with their group
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Dot-joined path of the open groups
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }

    /// Priority of the last record sent to syslog
    pub fn syslog_priority(&self) -> Option<Priority> {
        self.sinks.syslog.as_ref().and_then(|s| s.last_priority())
    }

    /// Validate, build and dispatch one event
    ///
    /// Disabled output is not an error: a notice is printed and `Ok` returned.
    ///
    /// # Errors
    ///
    /// Returns `StrictMode` when the context fails validation, before any sink
    /// runs. Otherwise returns the first sink error.
    pub fn handle(&self, ctx: &LogContext, event: &LogEvent) -> Result<()> {
        let out = &self.config.out;
        if !out.enabled {
            return self.notice(OUTPUT_DISABLED_NOTICE);
        }
        if !out.any_sink_enabled() {
            return self.notice(NO_SINK_NOTICE);
        }

        let record = build_record(
            event,
            ctx,
            &self.attrs,
            self.group.as_deref(),
            &self.config.mango,
        )
        .map_err(|e| {
            self.metrics.record_validation_failure();
            e
        })?;
        let json = record.to_json()?;
        self.metrics.record_dispatched();

        let mut first_error = None;
        for sink in self.sinks.iter() {
            if let Err(e) = sink.append(&record, &json) {
                self.metrics.record_sink_failure();
                match out.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::Continue => {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// New handler with `attrs` appended to the handler scope
    ///
    /// Keys are qualified with the groups open at this point.
    #[must_use]
    pub fn with_attrs<I, A>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attr>,
    {
        let mut handler = self.clone();
        handler.attrs.extend(attrs.into_iter().map(|attr| {
            let attr = attr.into();
            Attr {
                key: qualify(self.group.as_deref(), &attr.key),
                value: attr.value,
            }
        }));
        handler
    }

    /// New handler with `name` opened as a group
    ///
    /// An empty name returns an unchanged copy.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        let mut handler = self.clone();
        if !name.is_empty() {
            handler.group = Some(qualify(self.group.as_deref(), name));
        }
        handler
    }

    /// Flush every sink
    pub fn flush(&self) -> Result<()> {
        for sink in self.sinks.iter() {
            sink.flush()?;
        }
        Ok(())
    }

    fn notice(&self, message: &str) -> Result<()> {
        self.metrics.record_disabled_notice();
        self.streams
            .write_out(&format!("[LOGGER INFO] {}", message))
            .map_err(|e| {
                LoggerError::io_operation("writing notice", "cannot write to stdout", e)
            })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sinks: Vec<&str> = self.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("Handler")
            .field("attrs", &self.attrs)
            .field("group", &self.group)
            .field("sinks", &sinks)
            .finish_non_exhaustive()
    }
}
