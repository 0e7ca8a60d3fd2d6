//! meshping - Fleet Reachability Monitor
//!
//! Periodically checks network reachability between every pair of hosts in a
//! flat fleet. Each round runs one `fping` fan-out per host over SSH, parses the
//! per-link results and streams them to a single ordered sink.
//!
//! # Architecture
//!
//! - **Probe**: remote transport, `fping` output parser and per-host runner
//! - **Scheduler**: round timer, fan-out dispatcher and result sink
//! - **Config**: YAML configuration with validation
//! - **Monitor**: lifecycle wiring with graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use meshping::{MeshConfig, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MeshConfig::load("meshping.yaml")?;
//!     let summary = Monitor::new(config)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     println!("rendered {} results", summary.rendered);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod monitor;
pub mod probe;
pub mod scheduler;

pub use config::{ConfigError, MeshConfig};
pub use monitor::{Monitor, MonitorError, MonitorSummary};
pub use probe::{
    ParseError, ProbeOutcome, ProbeResult, ProbeRunner, SshTransport, Transport, TransportError,
    parse_probe_output,
};
pub use scheduler::{
    DrainReport, OutputFormat, ResultSink, RoundDispatcher, RoundScheduler, Schedule,
    SchedulerError, SinkError,
};
