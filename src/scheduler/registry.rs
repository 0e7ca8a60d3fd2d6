//! Round scheduler: fires the dispatcher on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};

use super::dispatcher::{DrainReport, RoundDispatcher};
use super::schedule::{Schedule, SchedulerError};

/// Default timeout for graceful shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Timer-driven owner of a [`RoundDispatcher`].
///
/// Uses `tokio-cron-scheduler` for the repeating job. Each tick only spawns
/// probe tasks, so a slow round never delays the next tick.
pub struct RoundScheduler {
    scheduler: JobScheduler,
    dispatcher: Arc<RoundDispatcher>,
    schedule: Schedule,
    job_id: Option<uuid::Uuid>,
}

impl RoundScheduler {
    /// Create a scheduler for `dispatcher`. Nothing runs until [`start`](Self::start).
    pub async fn new(
        dispatcher: Arc<RoundDispatcher>,
        schedule: Schedule,
    ) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        Ok(Self {
            scheduler,
            dispatcher,
            schedule,
            job_id: None,
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Register the round job and start ticking.
    pub async fn start(&mut self) -> Result<uuid::Uuid, SchedulerError> {
        let job = self.create_job()?;
        let job_id = self
            .scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        self.job_id = Some(job_id);
        tracing::info!(
            job_id = %job_id,
            schedule = %self.schedule,
            hosts = self.dispatcher.hosts().len(),
            "Round scheduler started"
        );
        Ok(job_id)
    }

    /// Stop ticking, then wait up to `timeout` for in-flight probes.
    ///
    /// If the timer does not stop in time, the dispatcher is still drained and
    /// closed, so a late tick spawns nothing.
    pub async fn shutdown_with_timeout(
        mut self,
        timeout: Duration,
    ) -> Result<DrainReport, SchedulerError> {
        let stopped = tokio::time::timeout(timeout, async {
            self.scheduler
                .shutdown()
                .await
                .map_err(|e| SchedulerError::Scheduler(e.to_string()))
        })
        .await;

        match stopped {
            Ok(Ok(())) => tracing::info!("Round scheduler stopped"),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Round scheduler shutdown failed");
                return Err(e);
            }
            Err(_) => tracing::warn!("Round scheduler stop timed out, late ticks ignored"),
        }

        let report = self.dispatcher.drain(timeout).await;
        tracing::info!(
            completed = report.completed,
            aborted = report.aborted,
            emitted = report.emitted,
            "In-flight probes drained"
        );
        Ok(report)
    }

    fn create_job(&self) -> Result<Job, SchedulerError> {
        let dispatcher = Arc::clone(&self.dispatcher);

        let callback = move |_: uuid::Uuid, _: JobScheduler| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move {
                dispatcher.dispatch();
            }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        };

        match &self.schedule {
            Schedule::Interval(d) => Job::new_repeated_async(*d, callback),
            Schedule::Cron(expr) => Job::new_cron_job_async(expr.as_str(), callback),
        }
        .map_err(|e| SchedulerError::Scheduler(e.to_string()))
    }
}

impl std::fmt::Debug for RoundScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundScheduler")
            .field("schedule", &self.schedule)
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::probe::{ProbeRunner, SshTransport};

    fn dispatcher() -> Arc<RoundDispatcher> {
        let (tx, _rx) = mpsc::unbounded_channel();
        let transport = Arc::new(SshTransport::new("/nonexistent/ssh", Duration::from_secs(1)));
        let runner = Arc::new(ProbeRunner::new(transport, "ops", "fping -C 1 -q", tx));
        Arc::new(RoundDispatcher::new(
            runner,
            vec!["h1".to_string(), "h2".to_string()],
            true,
        ))
    }

    #[tokio::test]
    async fn test_scheduler_lifecycle() {
        let mut scheduler =
            RoundScheduler::new(dispatcher(), Schedule::interval(Duration::from_secs(60)))
                .await
                .unwrap();
        assert!(scheduler.job_id.is_none());

        scheduler.start().await.unwrap();
        assert!(scheduler.job_id.is_some());
        assert_eq!(scheduler.schedule().to_string(), "every 1m");

        // first tick is a full interval away, so nothing is in flight
        let report = scheduler
            .shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(report, DrainReport::default());
    }

    #[tokio::test]
    async fn test_scheduler_cron_job() {
        let schedule = Schedule::cron("0 0 3 * * *").unwrap();
        let mut scheduler = RoundScheduler::new(dispatcher(), schedule).await.unwrap();
        scheduler.start().await.unwrap();
        scheduler
            .shutdown_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();
    }
}
