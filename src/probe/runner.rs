//! Probe runner: one remote fan-out probe from a single source host.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::parser::parse_probe_output;
use super::result::ProbeResult;
use super::transport::Transport;

/// Default remote fan-out command (destinations are appended).
pub const DEFAULT_PROBE_COMMAND: &str = "fping -C 1 -q";

/// Runs remote probes and emits their results onto the shared channel.
///
/// Every outcome is reported exactly once and never retried:
///
/// - Transport failure: a single [`ProbeResult::transport_failure`] record, the
///   output is not parsed.
/// - Transport success: one record per output line, in parser order.
/// - Malformed output: logged, nothing is emitted for that host.
pub struct ProbeRunner {
    transport: Arc<dyn Transport>,
    login: String,
    probe_command: String,
    results: UnboundedSender<ProbeResult>,
}

impl ProbeRunner {
    /// Create a runner executing `probe_command` as `login` over `transport`.
    pub fn new(
        transport: Arc<dyn Transport>,
        login: impl Into<String>,
        probe_command: impl Into<String>,
        results: UnboundedSender<ProbeResult>,
    ) -> Self {
        Self {
            transport,
            login: login.into(),
            probe_command: probe_command.into(),
            results,
        }
    }

    /// Remote command line for one probe.
    ///
    /// `|| true` keeps per-destination ping failures from failing the remote
    /// invocation, so a non-zero exit always means a transport problem.
    pub fn remote_command(&self, destinations: &[String]) -> String {
        format!("{} {} || true", self.probe_command, destinations.join(" "))
    }

    /// Probe every destination from `source` and emit the results.
    ///
    /// Returns the number of records emitted.
    pub async fn run(&self, source: &str, destinations: &[String]) -> usize {
        let command = self.remote_command(destinations);

        let output = match self.transport.execute(&self.login, source, &command).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(host = %source, error = %e, "Remote probe failed");
                return usize::from(self.emit(ProbeResult::transport_failure(source)));
            }
        };

        match parse_probe_output(source, &output) {
            Ok(results) => {
                tracing::debug!(host = %source, links = results.len(), "Remote probe completed");
                let mut emitted = 0;
                for result in results {
                    if self.emit(result) {
                        emitted += 1;
                    }
                }
                emitted
            }
            Err(e) => {
                tracing::error!(
                    host = %source,
                    error = %e,
                    "Discarding malformed probe output"
                );
                0
            }
        }
    }

    fn emit(&self, result: ProbeResult) -> bool {
        match self.results.send(result) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(result = %e.0, "Result channel closed, dropping result");
                false
            }
        }
    }
}

impl std::fmt::Debug for ProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRunner")
            .field("login", &self.login)
            .field("probe_command", &self.probe_command)
            .finish_non_exhaustive()
    }
}
