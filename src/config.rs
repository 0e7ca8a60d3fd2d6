//! Configuration module for meshping.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Login identity and the ordered host list
//! - Round cadence (interval or cron) and probe timeout
//! - Transport (`ssh`) and remote command (`fping`) settings
//! - Output format and shutdown drain bound

mod app;
mod validation;

pub use app::{FpingConfig, MeshConfig, SshConfig};
pub use validation::{ConfigError, expand_env_vars, validate_host, validate_username};

// Re-export constants
pub use app::{DEFAULT_INTERVAL, DEFAULT_PROBE_TIMEOUT};
