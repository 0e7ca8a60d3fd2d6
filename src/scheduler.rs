//! Scheduler Layer
//!
//! Fan-out/fan-in around a single results channel:
//!
//! - [`Schedule`]: Round cadence (fixed interval or cron)
//! - [`RoundDispatcher`]: Spawns one probe task per configured host on every tick
//! - [`RoundScheduler`]: Drives the dispatcher from a `tokio-cron-scheduler` job
//! - [`ResultSink`]: Single consumer rendering results in arrival order
//!
//! Results from different source hosts interleave non-deterministically; only
//! the records of a single probe run keep their relative order. Results carry
//! no round identifier.

mod dispatcher;
mod registry;
mod schedule;
mod sink;

pub use dispatcher::{DrainReport, RoundDispatcher};
pub use registry::{DEFAULT_SHUTDOWN_TIMEOUT, RoundScheduler};
pub use schedule::{MIN_INTERVAL, Schedule, SchedulerError};
pub use sink::{OutputFormat, ResultSink, SinkError};
