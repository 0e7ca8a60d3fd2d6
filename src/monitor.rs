//! Monitor lifecycle: wires configuration, transport, dispatcher, scheduler and
//! sink together and runs until a shutdown future resolves.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, oneshot};

use crate::config::{ConfigError, MeshConfig};
use crate::probe::{ProbeRunner, SshTransport, Transport};
use crate::scheduler::{
    DrainReport, ResultSink, RoundDispatcher, RoundScheduler, SchedulerError, SinkError,
};

/// Errors that end a monitor run.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The sink task panicked or was cancelled.
    #[error("result sink task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Totals reported once a run has shut down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    /// In-flight probe state at shutdown.
    pub drain: DrainReport,
    /// Records rendered by the sink over the whole run.
    pub rendered: usize,
}

/// A configured, not yet running, reachability monitor.
pub struct Monitor<W> {
    config: MeshConfig,
    transport: Arc<dyn Transport>,
    writer: W,
}

impl Monitor<tokio::io::Stdout> {
    /// Monitor probing over `ssh` and rendering to stdout.
    pub fn new(config: MeshConfig) -> Self {
        let transport = SshTransport::new(config.ssh.binary.clone(), config.timeout)
            .with_options(config.ssh.options.clone());
        Self::with_transport(config, Arc::new(transport), tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> Monitor<W> {
    /// Monitor with a custom transport and output stream.
    pub fn with_transport(config: MeshConfig, transport: Arc<dyn Transport>, writer: W) -> Self {
        Self {
            config,
            transport,
            writer,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Run rounds until `shutdown` resolves, then drain and stop.
    ///
    /// Shutdown order: stop the timer, wait for in-flight probes (bounded by
    /// `shutdown_timeout`), then let the sink render everything still queued.
    ///
    /// A sink that stops on its own (a failed write) also ends the run: the
    /// timer is stopped and the sink's error is returned without waiting for
    /// `shutdown`.
    pub async fn run<F>(self, shutdown: F) -> Result<MonitorSummary, MonitorError>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            transport,
            writer,
        } = self;
        let schedule = config.schedule()?;

        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let mut sink = ResultSink::new(writer, config.output);
        let mut sink_task = tokio::spawn(async move { sink.run(results_rx, stop_rx).await });

        let runner = Arc::new(ProbeRunner::new(
            transport,
            config.username.clone(),
            config.fping.command.clone(),
            results_tx,
        ));
        let dispatcher = Arc::new(RoundDispatcher::new(
            runner,
            config.hosts.clone(),
            config.include_self,
        ));

        let mut scheduler = RoundScheduler::new(dispatcher, schedule).await?;
        scheduler.start().await?;

        tokio::pin!(shutdown);
        let sink_stopped = tokio::select! {
            _ = &mut shutdown => None,
            finished = &mut sink_task => Some(finished),
        };

        if let Some(finished) = sink_stopped {
            let rendered = finished
                .map_err(MonitorError::from)
                .and_then(|sink| sink.map_err(MonitorError::from));
            match &rendered {
                Err(e) => tracing::error!(error = %e, "Result sink failed, stopping rounds"),
                Ok(_) => tracing::error!("Result sink stopped unexpectedly, stopping rounds"),
            }
            let drain = scheduler
                .shutdown_with_timeout(config.shutdown_timeout)
                .await?;
            let rendered = rendered?;
            return Ok(MonitorSummary { drain, rendered });
        }

        tracing::info!("Got signal, exiting!");

        let drain = scheduler
            .shutdown_with_timeout(config.shutdown_timeout)
            .await?;

        // Sink stops accepting and renders what is already queued
        let _ = stop_tx.send(());
        let rendered = sink_task.await??;

        tracing::info!(rendered, "Monitor stopped");
        Ok(MonitorSummary { drain, rendered })
    }
}

impl<W> std::fmt::Debug for Monitor<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use std::time::Duration;

    use super::*;
    use crate::probe::TransportError;

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let config = MeshConfig::new("ops", vec!["h1".to_string(), "h2".to_string()]);
        let monitor = Monitor::with_transport(
            config,
            Arc::new(SshTransport::new("/nonexistent/ssh", Duration::from_secs(1))),
            Vec::new(),
        );

        let summary = monitor.run(async {}).await.unwrap();
        assert_eq!(summary, MonitorSummary::default());
    }

    /// Writer that fails every write like a closed pipe.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Transport where every host reaches itself.
    struct LoopbackTransport {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Transport for LoopbackTransport {
        async fn execute(
            &self,
            _login: &str,
            host: &str,
            _command: &str,
        ) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{host} : 0.10"))
        }
    }

    #[tokio::test]
    async fn test_run_ends_when_sink_fails() {
        let mut config = MeshConfig::new("ops", vec!["h1".to_string(), "h2".to_string()]);
        config.interval = Duration::from_secs(1);
        let transport = Arc::new(LoopbackTransport {
            calls: AtomicUsize::new(0),
        });
        let monitor = Monitor::with_transport(config, transport.clone(), BrokenPipe);

        let err = tokio::time::timeout(
            Duration::from_secs(10),
            monitor.run(tokio::time::sleep(Duration::from_secs(60))),
        )
        .await
        .expect("run must not wait for the shutdown signal")
        .unwrap_err();

        match &err {
            MonitorError::Sink(SinkError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other}"),
        }
        assert!(transport.calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_schedule() {
        let mut config = MeshConfig::new("ops", vec!["h1".to_string()]);
        config.cron = Some("bogus".to_string());
        let monitor =
            Monitor::with_transport(config, Arc::new(SshTransport::default()), Vec::new());

        let err = monitor.run(async {}).await.unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }
}
