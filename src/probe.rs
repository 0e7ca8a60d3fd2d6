//! Probe Layer
//!
//! Remote fan-out probes: one `fping` invocation per source host, executed over
//! a remote transport, with its text output turned into per-link records.
//!
//! # Architecture
//!
//! - [`Transport`]: Remote execution seam ([`SshTransport`] in production)
//! - [`parse_probe_output`]: Pure parser for `fping -C 1 -q` style output
//! - [`ProbeRunner`]: Runs one probe and emits every [`ProbeResult`] onto the shared channel
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use meshping::{ProbeRunner, SshTransport};
//!
//! # async fn demo() {
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let transport = Arc::new(SshTransport::new("ssh", Duration::from_secs(20)));
//! let runner = ProbeRunner::new(transport, "ops", "fping -C 1 -q", tx);
//! let hosts = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
//! runner.run("10.0.0.1", &hosts).await;
//! while let Some(result) = rx.recv().await {
//!     println!("{result}");
//! }
//! # }
//! ```

mod parser;
mod result;
mod runner;
mod transport;

pub use parser::{FIELD_DELIMITER, ParseError, UNREACHABLE_MARKER, parse_probe_output};
pub use result::{LinkStatus, ProbeOutcome, ProbeResult, TRANSPORT_FAILURE_LABEL};
pub use runner::{DEFAULT_PROBE_COMMAND, ProbeRunner};
pub use transport::{DEFAULT_SSH_BINARY, SshTransport, Transport, TransportError};
