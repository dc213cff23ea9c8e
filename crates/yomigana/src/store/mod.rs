//! store モジュール
//!
//! レコードストアとの境界。パイプラインはこのトレイト越しにのみレコードを読み書きする。
pub mod json_store;
pub mod memory_store;
pub mod query;

use crate::errors::StoreError;
use crate::models::{Record, RecordId};

/// 再エクスポート
pub use json_store::JsonRecordStore;
pub use memory_store::MemoryRecordStore;
pub use query::RecordQuery;

/// レコードストアの共通インターフェース
pub trait RecordStore: Send + Sync {
  /// 検索式に一致するレコード ID を昇順で返す
  fn find_ids(&self, query: &RecordQuery) -> Result<Vec<RecordId>, StoreError>;

  /// レコードを1件読み込む
  fn load_record(&self, id: RecordId) -> Result<Record, StoreError>;

  /// レコードを書き戻す（本文とマーカーを1回の更新として反映する）
  fn commit_record(&self, record: &Record) -> Result<(), StoreError>;
}
