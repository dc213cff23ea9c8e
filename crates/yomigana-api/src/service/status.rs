//! Batch status relay
//!
//! The batch worker thread reports through [`ChannelReporter`] into a tokio mpsc channel.
//! A single pump task drains the channel and is the only writer of the
//! `watch<BatchStatus>` that handlers read.

use tokio::sync::{mpsc, watch};
use tracing::debug;
use yomigana::batch::{
  BatchPhase, BatchSummary, Notice, NoticeSink, ProgressReporter, progress_label,
};
use yomigana::models::Operation;

use crate::config::MAX_STATUS_NOTICES;
use crate::models::BatchStatus;

/// Event sent from the worker thread to the pump
#[derive(Debug, Clone)]
pub enum StatusEvent {
  /// A batch started
  Started {
    /// Operation
    operation: Operation,
    /// Selected records
    total: usize,
  },
  /// One record processed
  Progress {
    /// Processed records
    processed: usize,
    /// Selected records
    total: usize,
    /// Progress label
    label: String,
  },
  /// Human-readable notice
  Notice(String),
  /// The batch reached a terminal phase
  Finished(BatchSummary),
}

impl BatchStatus {
  /// Applies one event
  pub fn apply(&mut self, event: StatusEvent) {
    match event {
      StatusEvent::Started { operation, total } => {
        *self = BatchStatus {
          phase: BatchPhase::Running,
          operation: Some(operation),
          total,
          processed: 0,
          label: progress_label(0, total),
          notices: Vec::new(),
          summary: None,
        };
      }
      StatusEvent::Progress {
        processed,
        total,
        label,
      } => {
        self.processed = processed;
        self.total = total;
        self.label = label;
      }
      StatusEvent::Notice(text) => self.push_notice(text),
      StatusEvent::Finished(summary) => {
        self.phase = summary.phase;
        self.processed = summary.processed;
        self.push_notice(format!(
          "Processing completed. Total processed: {}",
          summary.processed
        ));
        self.summary = Some(summary);
      }
    }
  }

  fn push_notice(&mut self, text: String) {
    self.notices.push(text);
    if self.notices.len() > MAX_STATUS_NOTICES {
      let overflow = self.notices.len() - MAX_STATUS_NOTICES;
      self.notices.drain(..overflow);
    }
  }
}

/// Progress reporter / notice sink that forwards to the status pump
///
/// Send failures (pump gone) are ignored.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
  tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelReporter {
  /// Creates a reporter sending into `tx`
  pub fn new(tx: mpsc::UnboundedSender<StatusEvent>) -> Self {
    Self { tx }
  }

  fn send(&self, event: StatusEvent) {
    let _ = self.tx.send(event);
  }
}

impl ProgressReporter for ChannelReporter {
  fn on_start(&self, operation: Operation, total: usize) {
    self.send(StatusEvent::Started { operation, total });
  }

  fn on_update(&self, processed: usize, total: usize, label: &str) {
    self.send(StatusEvent::Progress {
      processed,
      total,
      label: label.to_string(),
    });
  }

  fn on_finish(&self, summary: &BatchSummary) {
    self.send(StatusEvent::Finished(summary.clone()));
  }
}

impl NoticeSink for ChannelReporter {
  fn notify(&self, notice: &Notice) {
    self.send(StatusEvent::Notice(notice.to_string()));
  }
}

/// Spawns the status pump on the current Tokio runtime
///
/// Returns the sending side for reporters and the receiving side for readers.
/// The pump ends when every sender is dropped.
///
/// # Panics
/// Must be called from within a Tokio runtime.
pub fn spawn_status_pump() -> (mpsc::UnboundedSender<StatusEvent>, watch::Receiver<BatchStatus>) {
  let (event_tx, mut event_rx) = mpsc::unbounded_channel::<StatusEvent>();
  let (status_tx, status_rx) = watch::channel(BatchStatus::default());

  tokio::spawn(async move {
    while let Some(event) = event_rx.recv().await {
      debug!(?event, "Status event");
      status_tx.send_modify(|status| status.apply(event));
    }
    debug!("Status pump stopped");
  });

  (event_tx, status_rx)
}
