//! Progress and notice reporting
//!
//! Reporters only observe; a lost event never changes what the batch does.

use std::fmt;

use tracing::{info, warn};

use crate::batch::{BatchSummary, RecordFailure};
use crate::models::{Operation, RecordId};

/// Progress label shown to the user
pub fn progress_label(processed: usize, total: usize) -> String {
  format!("Processed {processed} / {total}")
}

/// User-facing notice raised while processing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  /// The transform produced the text that was already there
  NothingToDo {
    /// Target record
    record_id: RecordId,
    /// Operation that was attempted
    operation: Operation,
  },
  /// The record could not be processed
  RecordFailed(RecordFailure),
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Notice::NothingToDo {
        record_id,
        operation: Operation::Add,
      } => write!(f, "Nothing to generate! (record {record_id})"),
      Notice::NothingToDo {
        record_id,
        operation: Operation::Remove,
      } => write!(f, "No furigana found to delete (record {record_id})"),
      Notice::RecordFailed(failure) => {
        write!(f, "Error processing record {}: {}", failure.record_id, failure.message)
      }
    }
  }
}

/// Receives start / update / finish events of a batch
pub trait ProgressReporter: Send + Sync {
  /// The batch started with `total` records
  fn on_start(&self, operation: Operation, total: usize);

  /// One more record has been processed
  fn on_update(&self, processed: usize, total: usize, label: &str);

  /// The batch reached a terminal phase
  fn on_finish(&self, summary: &BatchSummary);
}

/// Receives per-record notices
pub trait NoticeSink: Send + Sync {
  /// Reports one notice
  fn notify(&self, notice: &Notice);
}

/// Reporter that writes every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
  fn on_start(&self, operation: Operation, total: usize) {
    info!(%operation, total, "Batch started");
  }

  fn on_update(&self, processed: usize, total: usize, label: &str) {
    info!(processed, total, "{label}");
  }

  fn on_finish(&self, summary: &BatchSummary) {
    info!(
      operation = %summary.operation,
      phase = ?summary.phase,
      committed = summary.committed,
      skipped = summary.skipped_ineligible,
      unchanged = summary.unchanged,
      failures = summary.failures.len(),
      "Processing completed. Total processed: {}",
      summary.processed
    );
  }
}

impl NoticeSink for TracingReporter {
  fn notify(&self, notice: &Notice) {
    match notice {
      Notice::NothingToDo { .. } => info!("{notice}"),
      Notice::RecordFailed(_) => warn!("{notice}"),
    }
  }
}

/// Reporter that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
  fn on_start(&self, _operation: Operation, _total: usize) {}

  fn on_update(&self, _processed: usize, _total: usize, _label: &str) {}

  fn on_finish(&self, _summary: &BatchSummary) {}
}

impl NoticeSink for NoopReporter {
  fn notify(&self, _notice: &Notice) {}
}
