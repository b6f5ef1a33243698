//! Rotating file appender
//!
//! Appends one JSON line per record to a single file. Before a write that
//! would push the file past `max_size` bytes, the file is renamed to
//! `<stem>-<YYYY-MM-DDTHH-MM-SS.fff>.<ext>` and a fresh file is opened. After
//! each rotation old backups are pruned by count and age and, if enabled, the
//! remaining ones are gzip-compressed.

use crate::core::appender::Appender;
use crate::core::config::{FileOutputConfig, DEFAULT_MAX_SIZE_MB};
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::structured_entry::StructuredLog;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

/// Limits controlling when the file rotates and which backups survive
///
/// # Example
///
/// ```
/// use mango_logger::appenders::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(10 * 1024 * 1024)
///     .with_max_backups(5)
///     .with_max_age(Duration::from_secs(7 * 24 * 3600))
///     .with_compression(true);
///
/// assert_eq!(policy.max_backups, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Bytes a file may hold before rotating
    pub max_size: u64,
    /// Backups to keep, 0 keeps all
    pub max_backups: usize,
    /// Backups older than this are removed
    pub max_age: Option<Duration>,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE_MB * MEGABYTE,
            max_backups: 0,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy from file settings given in megabytes and days
    #[must_use]
    pub fn from_config(config: &FileOutputConfig) -> Self {
        let max_size_mb = if config.max_size == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            config.max_size
        };
        Self {
            max_size: max_size_mb.saturating_mul(MEGABYTE),
            max_backups: config.max_backups,
            max_age: (config.max_age > 0)
                .then(|| Duration::from_secs(config.max_age.saturating_mul(24 * 3600))),
            compress: config.compress,
        }
    }

    /// Set maximum file size in bytes, 0 restores the default
    #[must_use = "builder methods return a new value"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_size = if size == 0 {
            DEFAULT_MAX_SIZE_MB * MEGABYTE
        } else {
            size
        };
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// `<process>-mango.log` in the system temp directory
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("{}-mango.log", super::process_name()))
}

#[derive(Debug, Default)]
struct FileState {
    file: Option<File>,
    size: u64,
}

/// Size-rotating JSON-lines file appender
///
/// The file is opened on the first write. Writes from all threads are
/// serialized behind one lock, so each record lands as a whole line.
#[derive(Debug)]
pub struct RotatingFileAppender {
    path: PathBuf,
    policy: RotationPolicy,
    debug: bool,
    state: Mutex<FileState>,
}

impl RotatingFileAppender {
    /// Appender with the default policy
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_policy(path, RotationPolicy::default())
    }

    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy,
            debug: false,
            state: Mutex::new(FileState::default()),
        }
    }

    /// Appender for the file settings of a handler config
    ///
    /// An empty path selects [`default_log_path`].
    pub fn from_config(config: &FileOutputConfig) -> Self {
        let path = if config.path.as_os_str().is_empty() {
            default_log_path()
        } else {
            config.path.clone()
        };
        Self::with_policy(path, RotationPolicy::from_config(config)).with_debug(config.debug)
    }

    /// Also write DEBUG records
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the current file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    /// Append `line` plus a newline, rotating first if needed
    pub fn write_line(&self, line: &str) -> Result<()> {
        let len = line.len() as u64 + 1;
        if len > self.policy.max_size {
            return Err(LoggerError::file_appender(
                self.path.display().to_string(),
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.policy.max_size
                ),
            ));
        }

        let mut state = self.state.lock();
        if state.file.is_none() {
            self.open(&mut state)?;
        }
        if state.size + len > self.policy.max_size {
            self.rotate(&mut state)?;
        }

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let file = state.file.as_mut().ok_or_else(|| {
            LoggerError::file_appender(self.path.display().to_string(), "file not open")
        })?;
        file.write_all(&buf).map_err(|e| {
            LoggerError::io_operation(
                "writing log file",
                format!("cannot write to {}", self.path.display()),
                e,
            )
        })?;
        state.size += len;
        Ok(())
    }

    /// Open the log file for appending, creating parent directories
    fn open(&self, state: &mut FileState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to open log file: {}", e),
                )
            })?;
        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        state.file = Some(file);
        state.size = size;
        Ok(())
    }

    /// Move the current file aside and start a new one
    fn rotate(&self, state: &mut FileState) -> Result<()> {
        if let Some(mut file) = state.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.backup_path(Local::now());
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        self.open(state)?;

        if let Err(e) = self.prune() {
            eprintln!("[LOGGER WARNING] {}", e);
        }
        Ok(())
    }

    /// Stem and extension of the live file, e.g. `app` and `.log`
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mango".to_string());
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    /// A backup name for `time` not already taken by an earlier rotation
    fn backup_path(&self, time: DateTime<Local>) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let mut time = time;
        loop {
            let name = format!("{}-{}{}", stem, time.format(BACKUP_TIME_FORMAT), ext);
            let candidate = self.path.with_file_name(&name);
            let compressed = self.path.with_file_name(format!("{}{}", name, COMPRESS_SUFFIX));
            if !candidate.exists() && !compressed.exists() {
                return candidate;
            }
            time += ChronoDuration::milliseconds(1);
        }
    }

    /// Rotated files next to the live one, newest first
    fn backups(&self) -> Result<Vec<Backup>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };

        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "listing log backups",
                format!("cannot read {}", dir.display()),
                e,
            )
        })?;

        let mut backups: Vec<Backup> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let (stamp, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                    Some(rest) => (rest, true),
                    None => (name.as_str(), false),
                };
                let stamp = stamp.strip_prefix(&prefix)?.strip_suffix(ext.as_str())?;
                let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
                let rotated_at = Local.from_local_datetime(&naive).earliest()?;
                Some(Backup {
                    path: entry.path(),
                    rotated_at,
                    compressed,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
        Ok(backups)
    }

    /// Remove surplus and expired backups, then compress the rest
    fn prune(&self) -> Result<()> {
        let mut keep = self.backups()?;
        let mut remove = Vec::new();

        if self.policy.max_backups > 0 && keep.len() > self.policy.max_backups {
            remove.extend(keep.split_off(self.policy.max_backups));
        }

        if let Some(max_age) = self.policy.max_age {
            let cutoff = ChronoDuration::from_std(max_age)
                .ok()
                .and_then(|age| Local::now().checked_sub_signed(age));
            if let Some(cutoff) = cutoff {
                let (expired, fresh): (Vec<_>, Vec<_>) =
                    keep.into_iter().partition(|b| b.rotated_at < cutoff);
                remove.extend(expired);
                keep = fresh;
            }
        }

        for backup in &remove {
            if let Err(e) = fs::remove_file(&backup.path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old log file {}: {}",
                    backup.path.display(),
                    e
                );
            }
        }

        if self.policy.compress {
            for backup in keep.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Backup {
    path: PathBuf,
    rotated_at: DateTime<Local>,
    compressed: bool,
}

/// Gzip `path` to `<path>.gz` through a temporary file
///
/// The original is only removed after the compressed file is in place.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter, Read};

    let gz_path = with_suffix(path, COMPRESS_SUFFIX);
    let temp_gz_path = with_suffix(path, ".gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed: std::io::Result<()> = (|| {
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            encoder.write_all(&buffer[..read])?;
        }
        encoder.finish()?.flush()
    })();
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        "rotating_file"
    }

    fn append(&self, record: &StructuredLog, json: &str) -> Result<()> {
        match record.level {
            LogLevel::DEBUG if !self.debug => Ok(()),
            LogLevel::DEBUG | LogLevel::INFO | LogLevel::WARN | LogLevel::ERROR => {
                self.write_line(json)
            }
            other => Err(LoggerError::unrecognized_level(other)),
        }
    }

    fn flush(&self) -> Result<()> {
        if let Some(file) = self.state.lock().file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
