//! Handler configuration
//!
//! The tree mirrors the `mango`/`out` layout used in YAML and JSON config
//! files. Loading those files is left to the application; this module only
//! describes the already-parsed shape and offers `from_json_str` for callers
//! that hold the JSON text.

use super::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default format for verbose (DEBUG to stdout) output: the whole record
pub const DEFAULT_VERBOSE_FORMAT: &str = ".";

/// Default format for friendly (INFO and above) output
pub const DEFAULT_FRIENDLY_FORMAT: &str =
    r#""[\(.level)] - \(.ts) - \(.operation) - \(.message) - \(.attributes)""#;

/// Default rotation size in megabytes when `max-size` is zero
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    /// Field policy
    pub mango: MangoConfig,

    /// Where records go
    pub out: OutConfig,
}

impl LogConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text
    ///
    /// # Example
    ///
    /// ```
    /// use mango_logger::core::LogConfig;
    ///
    /// let config = LogConfig::from_json_str(r#"{
    ///     "mango": { "strict": true, "correlation-id": { "auto-generate": true } },
    ///     "out": { "enabled": true, "cli": { "enabled": true } }
    /// }"#).unwrap();
    ///
    /// assert!(config.mango.strict);
    /// assert!(config.out.cli.enabled);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_output(mut self, enabled: bool) -> Self {
        self.out.enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.mango.strict = strict;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_correlation(mut self, strict: bool, auto_generate: bool) -> Self {
        self.mango.correlation_id = CorrelationIdConfig {
            strict,
            auto_generate,
        };
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_console(mut self, cli: CliConfig) -> Self {
        self.out.cli = cli;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_file(mut self, file: FileOutputConfig) -> Self {
        self.out.file = file;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_syslog_facility(mut self, facility: impl Into<String>) -> Self {
        self.out.syslog.facility = facility.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.out.failure_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MangoConfig {
    /// Enforce type, application and operation in every log context
    pub strict: bool,

    pub correlation_id: CorrelationIdConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CorrelationIdConfig {
    /// Add correlationid to the required fields
    pub strict: bool,

    /// Generate a correlation id when the context has none
    pub auto_generate: bool,
}

/// What the dispatcher does after a sink fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Skip the remaining sinks and return the error
    #[default]
    FailFast,
    /// Still invoke every remaining sink, then return the first error
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutConfig {
    /// Kill switch for all output
    pub enabled: bool,

    pub failure_policy: FailurePolicy,

    pub file: FileOutputConfig,

    pub cli: CliConfig,

    pub syslog: SyslogConfig,
}

impl OutConfig {
    /// Syslog counts as enabled whenever a facility is named
    #[must_use]
    pub fn syslog_enabled(&self) -> bool {
        !self.syslog.facility.is_empty()
    }

    #[must_use]
    pub fn any_sink_enabled(&self) -> bool {
        self.file.enabled || self.cli.enabled || self.syslog_enabled()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub enabled: bool,

    /// Also write DEBUG records to the file
    pub debug: bool,

    /// Log file; `<process>-mango.log` in the temp dir when empty
    pub path: PathBuf,

    /// Megabytes before rotating, 0 means 100
    pub max_size: u64,

    /// Rotated files to keep, 0 keeps all
    pub max_backups: usize,

    /// Days to keep rotated files, 0 disables age-based removal
    pub max_age: u64,

    /// Gzip rotated files
    pub compress: bool,
}

impl FileOutputConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_limits(mut self, max_size_mb: u64, max_backups: usize, max_age_days: u64) -> Self {
        self.max_size = max_size_mb;
        self.max_backups = max_backups;
        self.max_age = max_age_days;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliConfig {
    /// Allow stdout/stderr output
    pub enabled: bool,

    /// Render INFO and above through `friendly_format` instead of raw JSON
    pub friendly: bool,

    pub friendly_format: String,

    /// Print DEBUG records through `verbose_format`
    pub verbose: bool,

    pub verbose_format: String,
}

impl CliConfig {
    /// Enabled console output printing raw JSON lines
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_friendly(mut self, friendly: bool) -> Self {
        self.friendly = friendly;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_friendly_format(mut self, format: impl Into<String>) -> Self {
        self.friendly_format = format.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_verbose_format(mut self, format: impl Into<String>) -> Self {
        self.verbose_format = format.into();
        self
    }

    /// Replace empty format expressions with the defaults
    pub fn apply_default_formats(&mut self) {
        if self.verbose_format.is_empty() {
            self.verbose_format = DEFAULT_VERBOSE_FORMAT.to_string();
        }
        if self.friendly_format.is_empty() {
            self.friendly_format = DEFAULT_FRIENDLY_FORMAT.to_string();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SyslogConfig {
    /// Facility name such as `user` or `local3`; empty disables syslog
    pub facility: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_disables_everything() {
        let config = LogConfig::default();
        assert!(!config.out.enabled);
        assert!(!config.out.any_sink_enabled());
        assert_eq!(config.out.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_apply_default_formats() {
        let mut cli = CliConfig::new();
        cli.apply_default_formats();
        assert_eq!(cli.verbose_format, DEFAULT_VERBOSE_FORMAT);
        assert_eq!(cli.friendly_format, DEFAULT_FRIENDLY_FORMAT);

        let mut cli = CliConfig::new().with_friendly_format(".message");
        cli.apply_default_formats();
        assert_eq!(cli.friendly_format, ".message");
    }

    #[test]
    fn test_syslog_enabled_by_facility() {
        let config = LogConfig::new().with_syslog_facility("local0");
        assert!(config.out.syslog_enabled());
        assert!(config.out.any_sink_enabled());
    }

    #[test]
    fn test_from_json_kebab_case() {
        let config = LogConfig::from_json_str(
            r#"{
                "out": {
                    "enabled": true,
                    "failure-policy": "continue",
                    "file": {
                        "enabled": true,
                        "max-size": 5,
                        "max-backups": 3,
                        "max-age": 7,
                        "compress": true
                    },
                    "cli": { "enabled": true, "friendly": true, "friendly-format": ".message" },
                    "syslog": { "facility": "daemon" }
                },
                "mango": {
                    "strict": true,
                    "correlation-id": { "strict": true, "auto-generate": false }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.out.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.out.file.max_size, 5);
        assert_eq!(config.out.file.max_backups, 3);
        assert_eq!(config.out.file.max_age, 7);
        assert!(config.out.file.compress);
        assert_eq!(config.out.cli.friendly_format, ".message");
        assert_eq!(config.out.syslog.facility, "daemon");
        assert!(config.mango.correlation_id.strict);
        assert!(!config.mango.correlation_id.auto_generate);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(LogConfig::from_json_str("{ not json").is_err());
    }
}
