//! Appender implementations

pub mod console;
pub mod rotating_file;
pub mod syslog;

pub use console::{ConsoleAppender, ConsoleStreams, MemoryWriter};
pub use rotating_file::{default_log_path, RotatingFileAppender, RotationPolicy};
#[cfg(unix)]
pub use syslog::UnixSyslogTransport;
pub use syslog::{
    default_transport, priority, Priority, SyslogAppender, SyslogConnection, SyslogFacility,
    SyslogSeverity, SyslogTransport, UnavailableSyslogTransport,
};

pub use crate::core::Appender;

/// File stem of the running executable
pub(crate) fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "mango".to_string())
}
