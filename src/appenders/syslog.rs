//! Syslog appender
//!
//! Each record opens a short-lived connection tagged with the record's
//! application, writes the JSON payload at `facility | severity` priority and
//! closes the connection again. The connection itself comes from a
//! [`SyslogTransport`], so platforms without a local syslog daemon (and tests)
//! can plug in their own.

use crate::core::{Appender, LogLevel, LoggerError, Result, StructuredLog};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

/// Standard syslog facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyslogFacility {
    Kern,
    User,
    Mail,
    Daemon,
    Auth,
    Syslog,
    News,
    Uucp,
    Cron,
    AuthPriv,
    Ftp,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl SyslogFacility {
    pub const ALL: [SyslogFacility; 19] = [
        SyslogFacility::Kern,
        SyslogFacility::User,
        SyslogFacility::Mail,
        SyslogFacility::Daemon,
        SyslogFacility::Auth,
        SyslogFacility::Syslog,
        SyslogFacility::News,
        SyslogFacility::Uucp,
        SyslogFacility::Cron,
        SyslogFacility::AuthPriv,
        SyslogFacility::Ftp,
        SyslogFacility::Local0,
        SyslogFacility::Local1,
        SyslogFacility::Local2,
        SyslogFacility::Local3,
        SyslogFacility::Local4,
        SyslogFacility::Local5,
        SyslogFacility::Local6,
        SyslogFacility::Local7,
    ];

    /// Facility code, already shifted into the priority byte
    pub const fn code(&self) -> u8 {
        match self {
            SyslogFacility::Kern => 0,
            SyslogFacility::User => 1 << 3,
            SyslogFacility::Mail => 2 << 3,
            SyslogFacility::Daemon => 3 << 3,
            SyslogFacility::Auth => 4 << 3,
            SyslogFacility::Syslog => 5 << 3,
            SyslogFacility::News => 7 << 3,
            SyslogFacility::Uucp => 8 << 3,
            SyslogFacility::Cron => 9 << 3,
            SyslogFacility::AuthPriv => 10 << 3,
            SyslogFacility::Ftp => 11 << 3,
            SyslogFacility::Local0 => 16 << 3,
            SyslogFacility::Local1 => 17 << 3,
            SyslogFacility::Local2 => 18 << 3,
            SyslogFacility::Local3 => 19 << 3,
            SyslogFacility::Local4 => 20 << 3,
            SyslogFacility::Local5 => 21 << 3,
            SyslogFacility::Local6 => 22 << 3,
            SyslogFacility::Local7 => 23 << 3,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SyslogFacility::Kern => "kern",
            SyslogFacility::User => "user",
            SyslogFacility::Mail => "mail",
            SyslogFacility::Daemon => "daemon",
            SyslogFacility::Auth => "auth",
            SyslogFacility::Syslog => "syslog",
            SyslogFacility::News => "news",
            SyslogFacility::Uucp => "uucp",
            SyslogFacility::Cron => "cron",
            SyslogFacility::AuthPriv => "authpriv",
            SyslogFacility::Ftp => "ftp",
            SyslogFacility::Local0 => "local0",
            SyslogFacility::Local1 => "local1",
            SyslogFacility::Local2 => "local2",
            SyslogFacility::Local3 => "local3",
            SyslogFacility::Local4 => "local4",
            SyslogFacility::Local5 => "local5",
            SyslogFacility::Local6 => "local6",
            SyslogFacility::Local7 => "local7",
        }
    }
}

impl FromStr for SyslogFacility {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| LoggerError::invalid_facility(s))
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severities used for the four record levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyslogSeverity {
    Err = 3,
    Warning = 4,
    Info = 6,
    Debug = 7,
}

impl SyslogSeverity {
    pub fn from_level(level: LogLevel) -> Result<Self> {
        match level {
            LogLevel::DEBUG => Ok(SyslogSeverity::Debug),
            LogLevel::INFO => Ok(SyslogSeverity::Info),
            LogLevel::WARN => Ok(SyslogSeverity::Warning),
            LogLevel::ERROR => Ok(SyslogSeverity::Err),
            other => Err(LoggerError::unrecognized_level(other)),
        }
    }

    pub const fn code(&self) -> u8 {
        *self as u8
    }
}

/// Facility and severity of one syslog message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority {
    pub facility: SyslogFacility,
    pub severity: SyslogSeverity,
}

impl Priority {
    /// `facility | severity`
    pub const fn code(&self) -> u8 {
        self.facility.code() | self.severity.code()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Priority for a facility name and record level
///
/// The level is checked before the facility.
///
/// # Example
///
/// ```
/// use mango_logger::appenders::priority;
/// use mango_logger::LogLevel;
///
/// assert_eq!(priority("local0", LogLevel::ERROR).unwrap().code(), 128 | 3);
/// assert!(priority("bogus", LogLevel::INFO).is_err());
/// ```
pub fn priority(facility: &str, level: LogLevel) -> Result<Priority> {
    let severity = SyslogSeverity::from_level(level)?;
    let facility = facility.parse::<SyslogFacility>()?;
    Ok(Priority { facility, severity })
}

/// An open connection to the syslog daemon
pub trait SyslogConnection: Send {
    fn write(&mut self, priority: Priority, payload: &str) -> io::Result<()>;

    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Opens syslog connections tagged with a program name
pub trait SyslogTransport: Send + Sync {
    /// # Errors
    ///
    /// `SyslogUnavailable` when the platform has no syslog, `SyslogConnect`
    /// when the daemon cannot be reached
    fn connect(&self, tag: &str) -> Result<Box<dyn SyslogConnection>>;
}

/// Transport for platforms without a local syslog daemon
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSyslogTransport;

impl SyslogTransport for UnavailableSyslogTransport {
    fn connect(&self, _tag: &str) -> Result<Box<dyn SyslogConnection>> {
        Err(LoggerError::SyslogUnavailable)
    }
}

#[cfg(unix)]
pub use unix::UnixSyslogTransport;

#[cfg(unix)]
mod unix {
    use super::{Priority, SyslogConnection, SyslogTransport};
    use crate::core::{LoggerError, Result};
    use chrono::Local;
    use std::io::{self, Write};
    use std::net::Shutdown;
    use std::os::unix::net::{UnixDatagram, UnixStream};
    use std::path::PathBuf;

    const SOCKET_PATHS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

    /// Local syslog daemon over its Unix socket
    #[derive(Debug, Clone)]
    pub struct UnixSyslogTransport {
        paths: Vec<PathBuf>,
    }

    impl UnixSyslogTransport {
        pub fn new() -> Self {
            Self::with_paths(SOCKET_PATHS.iter().map(PathBuf::from))
        }

        /// Try `paths` in order instead of the well-known socket locations
        pub fn with_paths<I, P>(paths: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                paths: paths.into_iter().map(Into::into).collect(),
            }
        }
    }

    impl Default for UnixSyslogTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    enum Socket {
        Datagram(UnixDatagram),
        Stream(UnixStream),
    }

    struct UnixSyslogConnection {
        socket: Socket,
        tag: String,
        pid: u32,
    }

    impl SyslogTransport for UnixSyslogTransport {
        fn connect(&self, tag: &str) -> Result<Box<dyn SyslogConnection>> {
            let mut last_error =
                io::Error::new(io::ErrorKind::NotFound, "no syslog socket configured");

            for path in &self.paths {
                let datagram = UnixDatagram::unbound().and_then(|s| s.connect(path).map(|()| s));
                let socket = match datagram {
                    Ok(socket) => Socket::Datagram(socket),
                    Err(_) => match UnixStream::connect(path) {
                        Ok(stream) => Socket::Stream(stream),
                        Err(e) => {
                            last_error = e;
                            continue;
                        }
                    },
                };
                return Ok(Box::new(UnixSyslogConnection {
                    socket,
                    tag: tag.to_string(),
                    pid: std::process::id(),
                }));
            }

            Err(LoggerError::syslog_connect(last_error))
        }
    }

    impl SyslogConnection for UnixSyslogConnection {
        fn write(&mut self, priority: Priority, payload: &str) -> io::Result<()> {
            let mut frame = format!(
                "<{}>{} {}[{}]: {}",
                priority.code(),
                Local::now().format("%b %e %H:%M:%S"),
                self.tag,
                self.pid,
                payload
            );
            if !frame.ends_with('\n') {
                frame.push('\n');
            }

            match &mut self.socket {
                Socket::Datagram(socket) => socket.send(frame.as_bytes()).map(|_| ()),
                Socket::Stream(stream) => stream.write_all(frame.as_bytes()),
            }
        }

        fn close(self: Box<Self>) -> io::Result<()> {
            match self.socket {
                Socket::Datagram(_) => Ok(()),
                Socket::Stream(stream) => match stream.shutdown(Shutdown::Both) {
                    Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
                    _ => Ok(()),
                },
            }
        }
    }
}

/// The syslog transport for this platform
pub fn default_transport() -> Arc<dyn SyslogTransport> {
    #[cfg(unix)]
    {
        Arc::new(UnixSyslogTransport::new())
    }
    #[cfg(not(unix))]
    {
        Arc::new(UnavailableSyslogTransport)
    }
}

/// Sends each record to syslog under the configured facility
pub struct SyslogAppender {
    facility: String,
    transport: Arc<dyn SyslogTransport>,
    last_priority: Mutex<Option<Priority>>,
}

impl SyslogAppender {
    /// The facility name is only checked when a record is appended
    pub fn new(facility: impl Into<String>, transport: Arc<dyn SyslogTransport>) -> Self {
        Self {
            facility: facility.into(),
            transport,
            last_priority: Mutex::new(None),
        }
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    /// Priority computed for the most recent record
    pub fn last_priority(&self) -> Option<Priority> {
        *self.last_priority.lock()
    }
}

impl fmt::Debug for SyslogAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogAppender")
            .field("facility", &self.facility)
            .field("last_priority", &self.last_priority())
            .finish_non_exhaustive()
    }
}

impl Appender for SyslogAppender {
    fn append(&self, record: &StructuredLog, json: &str) -> Result<()> {
        let priority = priority(&self.facility, record.level)?;
        *self.last_priority.lock() = Some(priority);

        let tag = if record.application.is_empty() {
            super::process_name()
        } else {
            record.application.clone()
        };

        let mut connection = self.transport.connect(&tag)?;
        connection
            .write(priority, json)
            .map_err(LoggerError::syslog_write)?;
        // the message is already delivered
        let _ = connection.close();
        Ok(())
    }

    fn name(&self) -> &str {
        "syslog"
    }
}
