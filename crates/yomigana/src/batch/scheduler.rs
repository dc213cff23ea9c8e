//! Batch Scheduler
//!
//! 1バッチ分の状態機械。`Idle -> Running -> {Completed, Cancelled}` の順に遷移し、
//! `step` を1回呼ぶごとにレコードを1件だけ処理する。
//! タイマーやスレッドなどの駆動役は外部に置き、`run_to_end` は同期的に最後まで回すための補助。

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analyzer::ReadingAnalyzer;
use crate::batch::{
  BatchSummary, CancelFlag, Notice, NoticeSink, ProgressReporter, RecordFailure, StepOutcome,
  progress_label,
};
use crate::codec::{contains_markup, render, strip};
use crate::config::AnnotationOptions;
use crate::errors::{BatchError, RecordError};
use crate::marker;
use crate::models::{Operation, RecordId};
use crate::store::RecordStore;

/// `run_to_end` の待機中にキャンセルを確認する間隔
const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// バッチの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPhase {
  /// 未開始
  #[default]
  Idle,
  /// 実行中
  Running,
  /// 全レコードを処理して終了
  Completed,
  /// キャンセルにより終了
  Cancelled,
}

impl BatchPhase {
  /// 終了状態（Completed / Cancelled）か
  pub fn is_terminal(&self) -> bool {
    matches!(self, BatchPhase::Completed | BatchPhase::Cancelled)
  }
}

/// 実行中バッチの状態
///
/// `start` 時に作成され、レコード1件ごとに更新される。
/// ID 集合と設定は開始時のスナップショットで、実行中の変更は反映されない。
#[derive(Debug, Clone)]
pub struct BatchState {
  operation: Operation,
  ids: Vec<RecordId>,
  next: usize,
  options: AnnotationOptions,
}

impl BatchState {
  /// 操作種別
  pub fn operation(&self) -> Operation {
    self.operation
  }

  /// 対象レコードの総数
  pub fn total(&self) -> usize {
    self.ids.len()
  }

  /// 処理済み件数
  pub fn processed(&self) -> usize {
    self.next
  }

  /// 開始時に取得した設定
  pub fn options(&self) -> &AnnotationOptions {
    &self.options
  }
}

/// ふりがな付与・除去バッチのスケジューラ
pub struct BatchScheduler {
  store: Arc<dyn RecordStore>,
  analyzer: Arc<dyn ReadingAnalyzer>,
  reporter: Arc<dyn ProgressReporter>,
  notices: Arc<dyn NoticeSink>,
  cancel: CancelFlag,
  step_interval: Duration,
  phase: BatchPhase,
  state: Option<BatchState>,
  summary: Option<BatchSummary>,
}

impl BatchScheduler {
  /// 依存を受け取って `Idle` 状態のスケジューラを作成
  pub fn new(
    store: Arc<dyn RecordStore>,
    analyzer: Arc<dyn ReadingAnalyzer>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> Self {
    Self {
      store,
      analyzer,
      reporter,
      notices,
      cancel: CancelFlag::new(),
      step_interval: Duration::ZERO,
      phase: BatchPhase::Idle,
      state: None,
      summary: None,
    }
  }

  /// `run_to_end` でレコード間に挟む待ち時間を設定
  #[must_use]
  pub fn with_step_interval(mut self, interval: Duration) -> Self {
    self.step_interval = interval;
    self
  }

  /// 現在の状態
  pub fn phase(&self) -> BatchPhase {
    self.phase
  }

  /// 実行中（または終了直後）のバッチ状態
  pub fn state(&self) -> Option<&BatchState> {
    self.state.as_ref()
  }

  /// キャンセル用ハンドル（他スレッドから `cancel()` できる）
  pub fn cancel_flag(&self) -> CancelFlag {
    self.cancel.clone()
  }

  /// 現在までの集計
  pub fn summary(&self) -> Option<&BatchSummary> {
    self.summary.as_ref()
  }

  /// バッチを開始する
  ///
  /// # Errors
  /// - `ids` が空: `BatchError::EmptySelection`（状態は変わらない）
  /// - 既に実行中: `BatchError::AlreadyRunning`
  pub fn start(
    &mut self,
    operation: Operation,
    ids: Vec<RecordId>,
    options: AnnotationOptions,
  ) -> Result<(), BatchError> {
    if self.phase == BatchPhase::Running {
      return Err(BatchError::AlreadyRunning);
    }
    if ids.is_empty() {
      return Err(BatchError::EmptySelection);
    }

    let total = ids.len();
    self.cancel.reset();
    self.state = Some(BatchState {
      operation,
      ids,
      next: 0,
      options,
    });
    self.summary = Some(BatchSummary::new(operation, total));
    self.phase = BatchPhase::Running;

    info!(%operation, total, ?options, "Batch start");
    self.reporter.on_start(operation, total);
    Ok(())
  }

  /// レコードを1件処理して状態を返す
  ///
  /// `Running` 以外では何もしない。キャンセルはレコード処理の前にだけ確認する。
  pub fn step(&mut self) -> BatchPhase {
    if self.phase != BatchPhase::Running {
      return self.phase;
    }

    if self.cancel.is_cancelled() {
      self.finish(BatchPhase::Cancelled);
      return self.phase;
    }

    let Some(state) = self.state.as_mut() else {
      return self.phase;
    };
    let Some(&id) = state.ids.get(state.next) else {
      self.finish(BatchPhase::Completed);
      return self.phase;
    };
    state.next += 1;
    let operation = state.operation;
    let options = state.options;
    let (processed, total) = (state.next, state.ids.len());

    let outcome = match self.process_record(id, operation, &options) {
      Ok(outcome) => {
        if outcome == StepOutcome::Unchanged {
          self.notices.notify(&Notice::NothingToDo {
            record_id: id,
            operation,
          });
        }
        outcome
      }
      Err(e) => {
        let failure = RecordFailure::from_error(id, &e);
        warn!(%id, stage = ?failure.stage, error = %e, "Record failed");
        self.notices.notify(&Notice::RecordFailed(failure.clone()));
        if let Some(summary) = self.summary.as_mut() {
          summary.record_failure(failure);
        }
        StepOutcome::Failed
      }
    };

    // 失敗は record_failure で計上済み
    if outcome != StepOutcome::Failed {
      if let Some(summary) = self.summary.as_mut() {
        summary.record_outcome(outcome);
      }
    }
    debug!(%id, ?outcome, processed, total, "Record step");
    self.reporter.on_update(processed, total, &progress_label(processed, total));

    if processed == total {
      self.finish(BatchPhase::Completed);
    }
    self.phase
  }

  /// 終了状態まで `step` を繰り返す
  ///
  /// レコード間では `step_interval` だけ待つ（待機中もキャンセルを確認する）。
  ///
  /// # Errors
  /// `start` 前に呼ばれた場合 `BatchError::NotStarted`
  pub fn run_to_end(&mut self) -> Result<BatchSummary, BatchError> {
    if self.phase == BatchPhase::Idle {
      return Err(BatchError::NotStarted);
    }

    while !self.step().is_terminal() {
      self.pause();
    }

    self.summary.clone().ok_or(BatchError::NotStarted)
  }

  fn pause(&self) {
    if self.step_interval.is_zero() {
      return;
    }
    let deadline = Instant::now() + self.step_interval;
    while !self.cancel.is_cancelled() {
      let now = Instant::now();
      if now >= deadline {
        break;
      }
      std::thread::sleep(PAUSE_SLICE.min(deadline - now));
    }
  }

  /// load → 判定 → strip → (analyze → render) → 比較 → commit
  fn process_record(
    &self,
    id: RecordId,
    operation: Operation,
    options: &AnnotationOptions,
  ) -> Result<StepOutcome, RecordError> {
    let mut record = self.store.load_record(id).map_err(RecordError::Load)?;

    if !marker::is_eligible(&record, operation) {
      let has_markup = contains_markup(&record.primary_text);
      let drifted = match operation {
        Operation::Add => !has_markup,
        Operation::Remove => has_markup,
      };
      if drifted {
        warn!(%id, marker = %record.marker, has_markup, "Marker does not match record text");
      }
      return Ok(StepOutcome::Ineligible);
    }

    let plain = strip(&record.primary_text);
    let candidate = match operation {
      Operation::Add => {
        let analysis = self.analyzer.analyze(&plain, options)?;
        render(&analysis, options)
      }
      Operation::Remove => plain,
    };

    if candidate == record.primary_text {
      return Ok(StepOutcome::Unchanged);
    }

    record.primary_text = candidate;
    record.marker = marker::advance(operation);
    self.store.commit_record(&record).map_err(RecordError::Commit)?;
    Ok(StepOutcome::Committed)
  }

  fn finish(&mut self, phase: BatchPhase) {
    self.phase = phase;
    let Some(summary) = self.summary.as_mut() else {
      return;
    };
    summary.phase = phase;

    info!(
      operation = %summary.operation,
      ?phase,
      processed = summary.processed,
      total = summary.total,
      failures = summary.failures.len(),
      "Batch finished"
    );
    self.reporter.on_finish(summary);
  }
}

impl std::fmt::Debug for BatchScheduler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BatchScheduler")
      .field("phase", &self.phase)
      .field("state", &self.state)
      .field("step_interval", &self.step_interval)
      .field("cancelled", &self.cancel.is_cancelled())
      .finish()
  }
}
