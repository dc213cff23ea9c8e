//! Response Model Definition

use serde::Serialize;
use yomigana::batch::{BatchPhase, BatchSummary};
use yomigana::models::Operation;

/// Response of `POST /furigana/add` and `POST /furigana/remove` (202 Accepted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunAccepted {
  /// Started operation
  pub operation: Operation,
  /// Number of records selected for the batch
  pub total: usize,
}

/// Response of `POST /furigana/cancel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelResponse {
  /// Whether a running batch was asked to stop
  pub cancelled: bool,
}

/// Progress of the current (or last) batch, as shown to the user
///
/// Only the status pump task mutates this value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatus {
  /// Batch phase (`idle` before the first batch)
  pub phase: BatchPhase,
  /// Operation of the current batch
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operation: Option<Operation>,
  /// Number of selected records
  pub total: usize,
  /// Number of processed records
  pub processed: usize,
  /// Progress label, e.g. "Processed 3 / 10"
  pub label: String,
  /// Recent notices, oldest first
  pub notices: Vec<String>,
  /// Final summary, once the batch has finished
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<BatchSummary>,
}
