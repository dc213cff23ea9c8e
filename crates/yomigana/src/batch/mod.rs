//! batch モジュール
//!
//! レコード ID 集合に対して ADD / REMOVE を1件ずつ適用するスケジューラと、
//! 進捗・通知の報告先を定義する。
pub mod cancel;
pub mod progress;
pub mod report;
pub mod scheduler;

/// 再エクスポート
pub use cancel::CancelFlag;
pub use progress::{
  Notice, NoticeSink, NoopReporter, ProgressReporter, TracingReporter, progress_label,
};
pub use report::{BatchSummary, FailureStage, RecordFailure, StepOutcome};
pub use scheduler::{BatchPhase, BatchScheduler, BatchState};
