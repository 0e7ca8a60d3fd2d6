//! Result sink: the single consumer of the results channel.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};

use crate::probe::ProbeResult;

/// Errors that stop the sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the output stream failed.
    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("failed to render result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Line format of rendered results.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// `h1 => h2: OK` style lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Renders every result as soon as it arrives, one line each.
///
/// No batching, deduplication or correlation across records.
#[derive(Debug)]
pub struct ResultSink<W> {
    writer: W,
    format: OutputFormat,
    rendered: usize,
}

impl<W: AsyncWrite + Unpin + Send> ResultSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            rendered: 0,
        }
    }

    /// Render a single result without the trailing newline.
    ///
    /// # Errors
    /// Returns `SinkError::Json` if JSON serialization fails.
    pub fn render(&self, result: &ProbeResult) -> Result<String, SinkError> {
        match self.format {
            OutputFormat::Text => Ok(result.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string(result)?),
        }
    }

    /// Render and flush one result.
    pub async fn write(&mut self, result: &ProbeResult) -> Result<(), SinkError> {
        let mut line = self.render(result)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        self.rendered += 1;
        Ok(())
    }

    /// Consume `results` until shutdown.
    ///
    /// When `shutdown` fires (or its sender is dropped) the channel is closed
    /// to new records and everything already queued is still rendered. Also
    /// returns once every producer is gone.
    ///
    /// Returns the total number of records rendered by this sink.
    pub async fn run(
        &mut self,
        mut results: mpsc::UnboundedReceiver<ProbeResult>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<usize, SinkError> {
        tracing::debug!(format = %self.format, "Result sink started");

        loop {
            tokio::select! {
                biased;
                next = results.recv() => match next {
                    Some(result) => self.write(&result).await?,
                    None => break,
                },
                _ = &mut shutdown => {
                    results.close();
                    while let Some(result) = results.recv().await {
                        self.write(&result).await?;
                    }
                    break;
                }
            }
        }

        tracing::debug!(rendered = self.rendered, "Result sink stopped");
        Ok(self.rendered)
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
