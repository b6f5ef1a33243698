//! Console appender implementation

use crate::core::{
    Appender, CliConfig, Filter, HandlerMetrics, LogLevel, LoggerError, Result, StructuredLog,
};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// The stdout/stderr pair a handler prints to
///
/// Clones share the same underlying writers; each line is written under that
/// writer's lock.
#[derive(Clone)]
pub struct ConsoleStreams {
    out: SharedWriter,
    err: SharedWriter,
}

impl ConsoleStreams {
    /// The process's standard output and standard error
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
        }
    }

    /// Write `line` plus a newline to the output stream
    pub fn write_out(&self, line: &str) -> io::Result<()> {
        write_line(&self.out, line)
    }

    /// Write `line` plus a newline to the error stream
    pub fn write_err(&self, line: &str) -> io::Result<()> {
        write_line(&self.err, line)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.out.lock().flush()?;
        self.err.lock().flush()
    }
}

impl Default for ConsoleStreams {
    fn default() -> Self {
        Self::stdio()
    }
}

impl fmt::Debug for ConsoleStreams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleStreams").finish_non_exhaustive()
    }
}

fn write_line(writer: &SharedWriter, line: &str) -> io::Result<()> {
    let mut writer = writer.lock();
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// In-memory `Write` target whose clones share one buffer
///
/// # Example
///
/// ```
/// use mango_logger::appenders::{ConsoleStreams, MemoryWriter};
///
/// let out = MemoryWriter::new();
/// let streams = ConsoleStreams::new(out.clone(), MemoryWriter::new());
/// streams.write_out("hello").unwrap();
///
/// assert_eq!(out.lines(), vec!["hello"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prints records to stdout (debug, info) and stderr (warn, error)
///
/// Debug records are printed only in verbose mode, through the verbose
/// filter. Other records are printed through the friendly filter when friendly
/// mode is on, otherwise as the raw JSON line.
pub struct ConsoleAppender {
    /// Present only when friendly mode is on
    friendly_filter: Option<Filter>,
    /// Present only when verbose mode is on
    verbose_filter: Option<Filter>,
    streams: ConsoleStreams,
    metrics: Arc<HandlerMetrics>,
}

impl ConsoleAppender {
    /// Build from console settings
    ///
    /// Only the expressions of enabled modes are checked. Empty expressions
    /// fall back to the default formats.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if an enabled mode's expression is not
    /// valid jq
    pub fn new(
        cli: &CliConfig,
        streams: ConsoleStreams,
        metrics: Arc<HandlerMetrics>,
    ) -> Result<Self> {
        let mut cli = cli.clone();
        cli.apply_default_formats();

        let friendly_filter = if cli.friendly {
            Some(compile("friendly-format", &cli.friendly_format)?)
        } else {
            None
        };
        let verbose_filter = if cli.verbose {
            Some(compile("verbose-format", &cli.verbose_format)?)
        } else {
            None
        };

        Ok(Self {
            friendly_filter,
            verbose_filter,
            streams,
            metrics,
        })
    }

    pub fn streams(&self) -> &ConsoleStreams {
        &self.streams
    }

    /// Render through `filter`, falling back to the raw line on failure
    fn render(&self, filter: &Filter, json: &str) -> String {
        match filter.render(json) {
            Ok(line) => line,
            Err(e) => {
                self.metrics.record_format_fallback();
                let _ = self.streams.write_err(&format!(
                    "[LOGGER WARNING] could not apply format {}: {}",
                    filter.source(),
                    e
                ));
                json.to_string()
            }
        }
    }

    fn styled(&self, json: &str) -> String {
        match &self.friendly_filter {
            Some(filter) => self.render(filter, json),
            None => json.to_string(),
        }
    }
}

fn compile(setting: &str, expression: &str) -> Result<Filter> {
    Filter::parse(expression).map_err(|e| {
        LoggerError::config("console", format!("{} '{}' is not valid: {}", setting, expression, e))
    })
}

fn stream_error(stream: &str, source: io::Error) -> LoggerError {
    LoggerError::io_operation("writing to console", format!("cannot write to {}", stream), source)
}

impl Appender for ConsoleAppender {
    fn append(&self, record: &StructuredLog, json: &str) -> Result<()> {
        match record.level {
            LogLevel::DEBUG => {
                if let Some(filter) = &self.verbose_filter {
                    let line = self.render(filter, json);
                    self.streams
                        .write_out(&line)
                        .map_err(|e| stream_error("stdout", e))?;
                }
                Ok(())
            }
            LogLevel::INFO => self
                .streams
                .write_out(&self.styled(json))
                .map_err(|e| stream_error("stdout", e)),
            LogLevel::WARN | LogLevel::ERROR => self
                .streams
                .write_err(&self.styled(json))
                .map_err(|e| stream_error("stderr", e)),
            other => Err(LoggerError::unrecognized_level(other)),
        }
    }

    fn flush(&self) -> Result<()> {
        self.streams.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
