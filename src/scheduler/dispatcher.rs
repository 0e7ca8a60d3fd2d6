//! Round dispatcher: one concurrent probe task per configured host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinSet;

use crate::probe::ProbeRunner;

/// Outcome of waiting for in-flight probes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Probe tasks that finished within the bound.
    pub completed: usize,
    /// Probe tasks still running at the deadline, now aborted.
    pub aborted: usize,
    /// Records emitted by the completed tasks.
    pub emitted: usize,
}

/// Spawns a full set of probe runners on every dispatch.
///
/// Dispatching never waits for earlier rounds: overlapping rounds each get a
/// complete set of tasks. Spawned tasks are kept in a [`JoinSet`] so shutdown
/// can wait for them via [`RoundDispatcher::drain`]. Once drained, the
/// dispatcher is closed and later dispatches spawn nothing.
pub struct RoundDispatcher {
    runner: Arc<ProbeRunner>,
    hosts: Arc<[String]>,
    include_self: bool,
    in_flight: Mutex<JoinSet<usize>>,
    closed: AtomicBool,
}

impl RoundDispatcher {
    /// Create a dispatcher probing `hosts` from each of `hosts`.
    pub fn new(runner: Arc<ProbeRunner>, hosts: Vec<String>, include_self: bool) -> Self {
        Self {
            runner,
            hosts: hosts.into(),
            include_self,
            in_flight: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Destinations probed from `source`, in configured order.
    ///
    /// The source itself stays in the list unless `include_self` is off; a
    /// failing self-ping points at the remote host rather than the network.
    pub fn destinations_for(&self, source: &str) -> Vec<String> {
        self.hosts
            .iter()
            .filter(|host| self.include_self || host.as_str() != source)
            .cloned()
            .collect()
    }

    /// Start one round: spawn a probe task per configured host and return
    /// immediately with the number of tasks spawned (zero once drained).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self) -> usize {
        let mut in_flight = self.lock_in_flight();
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Dispatcher closed, round skipped");
            return 0;
        }

        tracing::info!(hosts = self.hosts.len(), "Triggering pings...");
        while let Some(finished) = in_flight.try_join_next() {
            if let Err(e) = finished {
                tracing::error!(error = %e, "Probe task failed");
            }
        }

        for source in self.hosts.iter() {
            let runner = Arc::clone(&self.runner);
            let destinations = self.destinations_for(source);
            let source = source.clone();
            in_flight.spawn(async move { runner.run(&source, &destinations).await });
        }

        tracing::debug!(in_flight = in_flight.len(), "Round dispatched");
        self.hosts.len()
    }

    /// Number of probe tasks not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Close the dispatcher, wait up to `timeout` for every in-flight probe,
    /// then abort the rest.
    pub async fn drain(&self, timeout: Duration) -> DrainReport {
        let mut tasks = {
            let mut in_flight = self.lock_in_flight();
            self.closed.store(true, Ordering::Release);
            std::mem::take(&mut *in_flight)
        };
        let mut report = DrainReport::default();
        if tasks.is_empty() {
            return report;
        }

        tracing::info!(in_flight = tasks.len(), timeout = ?timeout, "Waiting for in-flight probes");
        let waited = tokio::time::timeout(timeout, async {
            while let Some(finished) = tasks.join_next().await {
                match finished {
                    Ok(emitted) => {
                        report.completed += 1;
                        report.emitted += emitted;
                    }
                    Err(e) => tracing::error!(error = %e, "Probe task failed"),
                }
            }
        })
        .await;

        if waited.is_err() {
            report.aborted = tasks.len();
            tasks.abort_all();
            tracing::warn!(aborted = report.aborted, "In-flight probes aborted at shutdown");
        }
        report
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, JoinSet<usize>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RoundDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundDispatcher")
            .field("hosts", &self.hosts)
            .field("include_self", &self.include_self)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
