//! バッチ結果のレポート型定義
//!
//! レコード単位の処理結果と、バッチ全体の集計を定義します。

use serde::{Deserialize, Serialize};

use crate::batch::BatchPhase;
use crate::errors::RecordError;
use crate::models::{Operation, RecordId};

/// 1レコードの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
  /// 本文とマーカーを書き戻した
  Committed,
  /// マーカーにより対象外と判定した
  Ineligible,
  /// 変換結果が元の本文と同一のため書き戻さなかった
  Unchanged,
  /// 読み込み・解析・書き込みのいずれかに失敗した
  Failed,
}

/// 失敗した処理段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
  /// レコードの読み込み
  Load,
  /// 読み解析
  Analyze,
  /// レコードの書き込み
  Commit,
}

/// レコード単位の失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
  /// 失敗したレコード
  pub record_id: RecordId,
  /// 失敗した段階
  pub stage: FailureStage,
  /// 人が読めるエラーメッセージ
  pub message: String,
}

impl RecordFailure {
  /// `RecordError` から失敗情報を作成
  pub fn from_error(record_id: RecordId, error: &RecordError) -> Self {
    let stage = match error {
      RecordError::Load(_) => FailureStage::Load,
      RecordError::Analyze(_) => FailureStage::Analyze,
      RecordError::Commit(_) => FailureStage::Commit,
    };
    Self {
      record_id,
      stage,
      message: error.to_string(),
    }
  }
}

/// バッチの集計結果
///
/// 終了時（完了・キャンセルとも）に `ProgressReporter::on_finish` へ渡される。
/// `processed` は対象外・変更なし・失敗を含めた処理済み件数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
  /// 操作種別
  pub operation: Operation,
  /// バッチの状態
  pub phase: BatchPhase,
  /// 対象レコードの総数
  pub total: usize,
  /// 処理済み件数
  pub processed: usize,
  /// 書き戻した件数
  pub committed: usize,
  /// マーカーにより対象外となった件数
  pub skipped_ineligible: usize,
  /// 変更がなく書き戻さなかった件数
  pub unchanged: usize,
  /// レコード単位の失敗
  pub failures: Vec<RecordFailure>,
}

impl BatchSummary {
  /// 集計を開始する
  pub fn new(operation: Operation, total: usize) -> Self {
    Self {
      operation,
      phase: BatchPhase::Running,
      total,
      processed: 0,
      committed: 0,
      skipped_ineligible: 0,
      unchanged: 0,
      failures: Vec::new(),
    }
  }

  /// 失敗が1件もないか
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }

  /// 処理結果を1件記録する
  pub fn record_outcome(&mut self, outcome: StepOutcome) {
    self.processed += 1;
    match outcome {
      StepOutcome::Committed => self.committed += 1,
      StepOutcome::Ineligible => self.skipped_ineligible += 1,
      StepOutcome::Unchanged => self.unchanged += 1,
      StepOutcome::Failed => {}
    }
  }

  /// 失敗を記録する（`processed` も進める）
  pub fn record_failure(&mut self, failure: RecordFailure) {
    self.record_outcome(StepOutcome::Failed);
    self.failures.push(failure);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::{AnalyzerError, StoreError};

  #[test]
  fn outcomes_are_counted() {
    let mut summary = BatchSummary::new(Operation::Add, 4);
    summary.record_outcome(StepOutcome::Committed);
    summary.record_outcome(StepOutcome::Ineligible);
    summary.record_outcome(StepOutcome::Unchanged);
    summary.record_failure(RecordFailure::from_error(
      RecordId::new(4),
      &RecordError::Commit(StoreError::Unavailable),
    ));

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.committed, 1);
    assert_eq!(summary.skipped_ineligible, 1);
    assert_eq!(summary.unchanged, 1);
    assert!(!summary.is_clean());
    assert_eq!(summary.failures[0].stage, FailureStage::Commit);
  }

  #[test]
  fn failure_stage_follows_error_kind() {
    let err = RecordError::Analyze(AnalyzerError::InvalidInput {
      reason: "NUL".to_string(),
    });
    let failure = RecordFailure::from_error(RecordId::new(1), &err);
    assert_eq!(failure.stage, FailureStage::Analyze);
    assert!(failure.message.contains("NUL"));
  }

  #[test]
  fn summary_serializes_phase_in_lowercase() {
    let summary = BatchSummary::new(Operation::Remove, 2);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["phase"], "running");
    assert_eq!(json["operation"], "remove");
  }
}
