//! Remote execution transport.
//!
//! The [`Transport`] trait is the seam between the probe runner and the remote
//! shell. [`SshTransport`] shells out to the system `ssh` client and relies on
//! pre-provisioned keys; it never prompts for credentials.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Default transport executable.
pub const DEFAULT_SSH_BINARY: &str = "ssh";

/// Transport-level failures. Per-destination ping failures never show up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport executable could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Executable that failed to start.
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote execution returned a non-zero status.
    #[error("remote execution failed ({status})")]
    Exit {
        /// Exit status of the transport process.
        status: ExitStatus,
        /// Combined stdout and stderr, for diagnostics.
        output: String,
    },

    /// No completion within the configured bound.
    #[error("remote execution timed out after {0:?}")]
    Timeout(Duration),
}

/// Runs a shell command on a remote host.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Run `command` on `host` as `login` and return combined stdout and stderr.
    ///
    /// # Errors
    /// Returns [`TransportError`] when the command could not be executed
    /// remotely or did not complete successfully.
    async fn execute(
        &self,
        login: &str,
        host: &str,
        command: &str,
    ) -> Result<String, TransportError>;
}

/// Transport backed by the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshTransport {
    binary: String,
    options: Vec<String>,
    timeout: Duration,
}

impl SshTransport {
    /// Create a transport running `binary` with a per-call timeout.
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            options: Vec::new(),
            timeout,
        }
    }

    /// Extra arguments passed before the `login@host` target.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SSH_BINARY, Duration::from_secs(20))
    }
}

/// Join stdout and stderr, keeping the two streams on separate lines.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !combined.is_empty() && !combined.ends_with('\n') && !stderr.is_empty() {
        combined.push('\n');
    }
    combined.push_str(&String::from_utf8_lossy(stderr));
    combined
}

#[async_trait::async_trait]
impl Transport for SshTransport {
    async fn execute(
        &self,
        login: &str,
        host: &str,
        command: &str,
    ) -> Result<String, TransportError> {
        let target = format!("{login}@{host}");
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.options)
            .arg(&target)
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(remote = %target, command = %command, "Executing remote probe");

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
            .map_err(|source| TransportError::Spawn {
                program: self.binary.clone(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if !output.status.success() {
            return Err(TransportError::Exit {
                status: output.status,
                output: combined,
            });
        }

        Ok(combined)
    }
}
