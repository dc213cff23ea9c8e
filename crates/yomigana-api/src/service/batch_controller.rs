//! Batch controller
//!
//! Owns at most one batch worker thread. Starting a new batch first cancels the
//! running one and waits for its thread to exit, so two batches never overlap.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use yomigana::YomiganaService;
use yomigana::batch::{BatchPhase, BatchSummary, CancelFlag};
use yomigana::errors::{BatchError, YomiganaError};
use yomigana::models::Operation;

use crate::errors::{ApiError, Result};
use crate::models::{BatchStatus, RunAccepted};
use crate::service::status::{ChannelReporter, StatusEvent, spawn_status_pump};

/// Worker thread of the running (or last) batch
struct ActiveBatch {
  cancel: CancelFlag,
  handle: JoinHandle<()>,
}

impl ActiveBatch {
  fn stop(self) {
    self.cancel.cancel();
    if self.handle.join().is_err() {
      error!("Batch worker thread panicked");
    }
  }
}

/// Single-batch controller
pub struct BatchController {
  service: Arc<YomiganaService>,
  active: Mutex<Option<ActiveBatch>>,
  events: mpsc::UnboundedSender<StatusEvent>,
  status: watch::Receiver<BatchStatus>,
}

impl BatchController {
  /// Creates the controller and its status pump
  ///
  /// # Panics
  /// Must be called from within a Tokio runtime.
  pub fn new(service: Arc<YomiganaService>) -> Self {
    let (events, status) = spawn_status_pump();
    Self {
      service,
      active: Mutex::new(None),
      events,
      status,
    }
  }

  /// Starts a batch, stopping the previous one first
  ///
  /// Blocks while the previous worker finishes its in-flight record; call from a
  /// blocking context.
  ///
  /// # Errors
  /// - No record matches: `ApiError::EmptySelection`
  /// - Invalid query: `ApiError::InvalidInput`
  /// - The worker thread cannot be spawned: `ApiError::Internal`
  pub fn start(&self, operation: Operation, query: Option<String>) -> Result<RunAccepted> {
    let mut active =
      self.active.lock().map_err(|_| ApiError::internal("batch controller lock poisoned"))?;

    if let Some(previous) = active.take() {
      info!("Stopping previous batch before starting a new one");
      previous.stop();
    }

    let reporter = Arc::new(ChannelReporter::new(self.events.clone()));
    let mut scheduler = self
      .service
      .prepare(operation, query.as_deref(), reporter.clone(), reporter)
      .map_err(|e| match e {
        YomiganaError::Batch(BatchError::EmptySelection) => {
          ApiError::empty_selection(query.clone())
        }
        other => ApiError::from(other),
      })?;

    let total = scheduler.state().map_or(0, |s| s.total());
    let cancel = scheduler.cancel_flag();

    let handle = std::thread::Builder::new()
      .name("yomigana-batch".to_string())
      .spawn(move || {
        if let Err(e) = scheduler.run_to_end() {
          warn!(error = %e, "Batch ended with error");
        }
      })
      .map_err(|e| {
        // 開始通知は送信済みなので、実行されなかったバッチを中断扱いで閉じる
        let mut summary = BatchSummary::new(operation, total);
        summary.phase = BatchPhase::Cancelled;
        let _ = self.events.send(StatusEvent::Finished(summary));
        ApiError::internal(format!("failed to spawn batch worker: {e}"))
      })?;

    info!(%operation, total, "Batch worker started");
    *active = Some(ActiveBatch { cancel, handle });

    Ok(RunAccepted { operation, total })
  }

  /// Asks the running batch to stop after its current record
  ///
  /// Returns `false` when no batch is running.
  pub fn cancel(&self) -> bool {
    let Ok(active) = self.active.lock() else {
      return false;
    };
    match active.as_ref() {
      Some(batch) if !batch.handle.is_finished() => {
        batch.cancel.cancel();
        info!("Batch cancellation requested");
        true
      }
      _ => false,
    }
  }

  /// Whether a batch worker is still running
  pub fn is_running(&self) -> bool {
    self
      .active
      .lock()
      .map(|a| a.as_ref().is_some_and(|b| !b.handle.is_finished()))
      .unwrap_or(false)
  }

  /// Latest status published by the pump
  pub fn status(&self) -> BatchStatus {
    self.status.borrow().clone()
  }

  /// Subscribes to status changes
  pub fn subscribe(&self) -> watch::Receiver<BatchStatus> {
    self.status.clone()
  }

  /// Cancels the running batch and waits for its worker to exit
  pub fn shutdown(&self) {
    let previous = match self.active.lock() {
      Ok(mut active) => active.take(),
      Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(previous) = previous {
      previous.stop();
      info!("Batch worker stopped");
    }
  }

  /// Phase of the last published status
  pub fn phase(&self) -> BatchPhase {
    self.status.borrow().phase
  }
}

impl Drop for BatchController {
  fn drop(&mut self) {
    self.shutdown();
  }
}
