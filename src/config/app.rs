//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::{DEFAULT_PROBE_COMMAND, DEFAULT_SSH_BINARY};
use crate::scheduler::{DEFAULT_SHUTDOWN_TIMEOUT, OutputFormat, Schedule};

use super::validation::{ConfigError, expand_env_vars, validate_host, validate_username};

// =============================================================================
// Constants
// =============================================================================

/// Default round interval (30 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Default per-probe transport timeout (20 seconds).
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(20);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}

fn default_shutdown_timeout() -> Duration {
    DEFAULT_SHUTDOWN_TIMEOUT
}

fn default_include_self() -> bool {
    true
}

// =============================================================================
// Transport Configuration
// =============================================================================

/// Remote execution transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Transport executable (default: "ssh").
    pub binary: String,

    /// Extra arguments placed before the `user@host` target.
    pub options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_SSH_BINARY.to_string(),
            options: Vec::new(),
        }
    }
}

/// Remote fan-out ping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpingConfig {
    /// Command prefix; destinations are appended (default: "fping -C 1 -q").
    pub command: String,
}

impl Default for FpingConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_PROBE_COMMAND.to_string(),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level configuration, immutable once loaded.
///
/// Only `username` and `hosts` are required:
///
/// ```yaml
/// username: ops
/// hosts:
///   - 172.17.0.6
///   - 172.17.0.7
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Login identity on every host. `${VAR}` references are expanded.
    pub username: String,

    /// Hosts in probe order. Duplicates are kept.
    pub hosts: Vec<String>,

    /// Round interval (default: 30s, minimum: 1s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Cron expression replacing `interval` when set.
    #[serde(default)]
    pub cron: Option<String>,

    /// Per-probe transport timeout (default: 20s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Whether each host also pings itself (default: true).
    #[serde(default = "default_include_self")]
    pub include_self: bool,

    /// Transport settings.
    #[serde(default)]
    pub ssh: SshConfig,

    /// Remote command settings.
    #[serde(default)]
    pub fping: FpingConfig,

    /// Output format of the result feed (default: text).
    #[serde(default)]
    pub output: OutputFormat,

    /// Bound on waiting for in-flight probes at shutdown (default: 5s).
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl MeshConfig {
    /// Create a configuration with defaults for everything but the essentials.
    pub fn new(username: impl Into<String>, hosts: Vec<String>) -> Self {
        Self {
            username: username.into(),
            hosts,
            interval: DEFAULT_INTERVAL,
            cron: None,
            timeout: DEFAULT_PROBE_TIMEOUT,
            include_self: true,
            ssh: SshConfig::default(),
            fping: FpingConfig::default(),
            output: OutputFormat::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.username = expand_env_vars(&config.username);
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_username(&self.username).map_err(ConfigError::ValidationError)?;

        if self.hosts.is_empty() {
            return Err(ConfigError::ValidationError(
                "hosts must list at least one host".to_string(),
            ));
        }

        for host in &self.hosts {
            validate_host(host).map_err(ConfigError::ValidationError)?;
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout must be positive".to_string(),
            ));
        }

        if self.ssh.binary.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ssh binary cannot be empty".to_string(),
            ));
        }

        if self.fping.command.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "fping command cannot be empty".to_string(),
            ));
        }

        self.schedule()?;
        Ok(())
    }

    /// Round schedule: `cron` when set, otherwise `interval`.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        match &self.cron {
            Some(expr) => Schedule::cron(expr)
                .map_err(|e| ConfigError::ValidationError(format!("cron: {}", e))),
            None => Ok(Schedule::interval(self.interval)),
        }
    }
}
