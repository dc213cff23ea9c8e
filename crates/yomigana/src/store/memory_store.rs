//! In-memory record store

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::errors::StoreError;
use crate::models::{Record, RecordId};
use crate::store::{RecordQuery, RecordStore};

/// `RwLock<BTreeMap>` で保持するレコードストア
///
/// テストと組み込み用途向け。`fail_commits_for` で特定レコードへの書き込み失敗を注入できる。
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
  records: RwLock<BTreeMap<RecordId, Record>>,
  /// 書き込みを拒否するレコードとその理由
  rejected: RwLock<HashMap<RecordId, String>>,
  /// 成功したコミットの回数
  commits: AtomicUsize,
}

impl MemoryRecordStore {
  /// 空のストアを作成
  pub fn new() -> Self {
    Self::default()
  }

  /// レコード列からストアを作成（同じ ID は後勝ち）
  pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
    let store = Self::new();
    {
      let mut map = store.records.write().unwrap_or_else(|e| e.into_inner());
      for record in records {
        map.insert(record.id, record);
      }
    }
    store
  }

  /// レコードを追加または置換する
  ///
  /// # Errors
  /// ロックが poison 状態の場合 `StoreError::Unavailable`
  pub fn insert(&self, record: Record) -> Result<(), StoreError> {
    let mut map = self.records.write().map_err(|_| StoreError::Unavailable)?;
    map.insert(record.id, record);
    Ok(())
  }

  /// レコードの複製を返す
  pub fn get(&self, id: RecordId) -> Option<Record> {
    self.records.read().ok()?.get(&id).cloned()
  }

  /// 保持しているレコード数
  pub fn len(&self) -> usize {
    self.records.read().map(|m| m.len()).unwrap_or(0)
  }

  /// レコードを1件も保持していないか
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// 以後 `id` への書き込みを `StoreError::WriteRejected` で失敗させる
  pub fn fail_commits_for(&self, id: RecordId, reason: impl Into<String>) {
    if let Ok(mut rejected) = self.rejected.write() {
      rejected.insert(id, reason.into());
    }
  }

  /// 成功したコミットの回数
  pub fn commit_count(&self) -> usize {
    self.commits.load(Ordering::SeqCst)
  }
}

impl RecordStore for MemoryRecordStore {
  fn find_ids(&self, query: &RecordQuery) -> Result<Vec<RecordId>, StoreError> {
    let map = self.records.read().map_err(|_| StoreError::Unavailable)?;
    // BTreeMap の走査順がそのまま ID 昇順
    Ok(map.values().filter(|r| query.matches(r)).map(|r| r.id).collect())
  }

  fn load_record(&self, id: RecordId) -> Result<Record, StoreError> {
    let map = self.records.read().map_err(|_| StoreError::Unavailable)?;
    map.get(&id).cloned().ok_or(StoreError::NotFound(id))
  }

  fn commit_record(&self, record: &Record) -> Result<(), StoreError> {
    {
      let rejected = self.rejected.read().map_err(|_| StoreError::Unavailable)?;
      if let Some(reason) = rejected.get(&record.id) {
        return Err(StoreError::WriteRejected {
          id: record.id,
          reason: reason.clone(),
        });
      }
    }

    let mut map = self.records.write().map_err(|_| StoreError::Unavailable)?;
    if !map.contains_key(&record.id) {
      return Err(StoreError::NotFound(record.id));
    }
    map.insert(record.id, record.clone());
    self.commits.fetch_add(1, Ordering::SeqCst);

    debug!(id = %record.id, marker = %record.marker, "Record committed");
    Ok(())
  }
}
