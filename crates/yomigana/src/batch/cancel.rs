//! 協調的キャンセル

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// バッチの協調的キャンセルを伝えるハンドル
///
/// クローンはすべて同じフラグを共有する。スケジューラは各レコード処理の先頭でのみ確認するため、
/// 処理中のレコードはコミットまで完了する。
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  /// 未キャンセル状態のフラグを作成
  pub fn new() -> Self {
    Self::default()
  }

  /// キャンセルを要求する
  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  /// キャンセルが要求されているか
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }

  pub(crate) fn reset(&self) {
    self.0.store(false, Ordering::SeqCst);
  }
}
