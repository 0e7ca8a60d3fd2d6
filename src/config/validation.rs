//! Configuration validation utilities.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

/// Validate a host identifier.
///
/// Hosts end up both in an `ssh` target and in a remote shell command line,
/// so only hostname, IPv4 and IPv6 characters are accepted and a leading `-`
/// (option injection) is rejected.
pub fn validate_host(host: &str) -> Result<(), String> {
    static HOST_REGEX: OnceLock<Regex> = OnceLock::new();

    let regex = HOST_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.:%\[\]-]+$").expect("failed to compile host regex")
    });

    if host.is_empty() {
        return Err("host cannot be empty".to_string());
    }
    if host.starts_with('-') {
        return Err(format!("host '{host}' must not start with '-'"));
    }
    if !regex.is_match(host) {
        return Err(format!("host '{host}' contains invalid characters"));
    }
    Ok(())
}

/// Validate the login identity.
///
/// The login becomes the `user@host` argument of the transport, so a leading
/// `-`, whitespace and `@` are rejected.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("username cannot be empty".to_string());
    }
    if username.starts_with('-') {
        return Err(format!("username '{username}' must not start with '-'"));
    }
    if username.chars().any(|c| c.is_whitespace() || c == '@') {
        return Err(format!("username '{username}' must not contain whitespace or '@'"));
    }
    Ok(())
}
