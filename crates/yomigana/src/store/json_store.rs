//! File-backed record store (`records.json`)
//!
//! The collection lives in two files:
//!
//! - `records.json`: snapshot, a JSON array of records
//! - `records.json.journal`: committed records appended one JSON object per line
//!
//! A commit appends the single changed record to the journal and syncs it, so the
//! cost of a commit does not grow with the size of the collection. Opening the
//! store replays the journal over the snapshot and folds both back into a fresh
//! snapshot. The snapshot is always replaced through a temporary file in the same
//! directory followed by an atomic rename, so a crash leaves either the old or the
//! new snapshot.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::models::{Record, RecordId};
use crate::store::{RecordQuery, RecordStore};

/// Journal entries tolerated before a commit folds them into the snapshot,
/// when the collection itself is smaller than this
const JOURNAL_COMPACT_MIN: usize = 256;

/// Suffix appended to the snapshot file name to get the journal path
const JOURNAL_SUFFIX: &str = ".journal";

#[derive(Debug, Default)]
struct StoreState {
  records: BTreeMap<RecordId, Record>,
  journal_entries: usize,
}

/// Record store persisted as a JSON snapshot plus an append-only journal
#[derive(Debug)]
pub struct JsonRecordStore {
  path: PathBuf,
  journal_path: PathBuf,
  state: RwLock<StoreState>,
}

impl JsonRecordStore {
  /// Opens the store at `path`.
  ///
  /// A missing file is treated as an empty store; the file is created on the first write.
  /// Pending journal entries are applied and compacted into the snapshot.
  ///
  /// # Errors
  /// - The file exists but cannot be read: `StoreError::Io`
  /// - The file is not a JSON array of records: `StoreError::Json`
  /// - A journal line other than the last one is broken: `StoreError::Json`
  pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    let journal_path = journal_path_for(&path);

    let mut records: BTreeMap<RecordId, Record> = if path.exists() {
      let raw = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
      let list: Vec<Record> = if raw.trim().is_empty() {
        Vec::new()
      } else {
        serde_json::from_str(&raw).map_err(|e| json_error(&path, e))?
      };
      list.into_iter().map(|r| (r.id, r)).collect()
    } else {
      BTreeMap::new()
    };

    let replayed = replay_journal(&journal_path, &mut records)?;

    let store = Self {
      path,
      journal_path,
      state: RwLock::new(StoreState {
        records,
        journal_entries: replayed,
      }),
    };

    if store.journal_path.exists() {
      store.compact()?;
    }

    info!(
      path = %store.path.display(),
      records = store.len(),
      replayed,
      "Opened record store"
    );
    Ok(store)
  }

  /// Path of the snapshot file
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Path of the journal file
  pub fn journal_path(&self) -> &Path {
    &self.journal_path
  }

  /// Number of records
  pub fn len(&self) -> usize {
    self.state.read().map(|s| s.records.len()).unwrap_or(0)
  }

  /// Whether the store holds no records
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Adds or replaces a record and rewrites the snapshot.
  ///
  /// # Errors
  /// Write failures leave both the files and the in-memory state unchanged.
  pub fn insert(&self, record: Record) -> Result<(), StoreError> {
    let mut state = self.state.write().map_err(|_| StoreError::Unavailable)?;
    let mut next = state.records.clone();
    next.insert(record.id, record);
    self.write_snapshot(&next)?;
    state.records = next;
    state.journal_entries = 0;
    Ok(())
  }

  /// Folds the journal into a fresh snapshot and removes the journal.
  ///
  /// # Errors
  /// The snapshot cannot be written or the journal cannot be removed: `StoreError::Io`
  pub fn compact(&self) -> Result<(), StoreError> {
    let mut state = self.state.write().map_err(|_| StoreError::Unavailable)?;
    self.write_snapshot(&state.records)?;
    state.journal_entries = 0;
    Ok(())
  }

  /// Writes the snapshot atomically, then drops the journal it supersedes.
  fn write_snapshot(&self, records: &BTreeMap<RecordId, Record>) -> Result<(), StoreError> {
    let dir = parent_dir(&self.path);
    std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

    let list: Vec<&Record> = records.values().collect();
    let body = serde_json::to_vec_pretty(&list).map_err(|e| json_error(&self.path, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| io_error(&dir, e))?;
    tmp.write_all(&body).map_err(|e| io_error(tmp.path(), e))?;
    tmp.flush().map_err(|e| io_error(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
    tmp.persist(&self.path).map_err(|e| io_error(&self.path, e.error))?;

    match std::fs::remove_file(&self.journal_path) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(io_error(&self.journal_path, e)),
    }

    debug!(path = %self.path.display(), records = records.len(), "Record snapshot written");
    Ok(())
  }

  /// Appends one record to the journal and syncs it.
  ///
  /// A failed write is cut back off the journal so the next append starts on a
  /// clean line.
  fn append_journal(&self, record: &Record) -> Result<(), StoreError> {
    let dir = parent_dir(&self.path);
    std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

    let mut line = serde_json::to_vec(record).map_err(|e| json_error(&self.journal_path, e))?;
    line.push(b'\n');

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.journal_path)
      .map_err(|e| io_error(&self.journal_path, e))?;
    let before = file.metadata().map_err(|e| io_error(&self.journal_path, e))?.len();

    let written = file.write_all(&line).and_then(|()| file.sync_data());
    if let Err(e) = written {
      if let Err(truncate_err) = file.set_len(before) {
        warn!(
          path = %self.journal_path.display(),
          error = %truncate_err,
          "Failed to cut back a partial journal entry"
        );
      }
      return Err(io_error(&self.journal_path, e));
    }
    Ok(())
  }
}

impl RecordStore for JsonRecordStore {
  fn find_ids(&self, query: &RecordQuery) -> Result<Vec<RecordId>, StoreError> {
    let state = self.state.read().map_err(|_| StoreError::Unavailable)?;
    Ok(state.records.values().filter(|r| query.matches(r)).map(|r| r.id).collect())
  }

  fn load_record(&self, id: RecordId) -> Result<Record, StoreError> {
    let state = self.state.read().map_err(|_| StoreError::Unavailable)?;
    state.records.get(&id).cloned().ok_or(StoreError::NotFound(id))
  }

  fn commit_record(&self, record: &Record) -> Result<(), StoreError> {
    let mut state = self.state.write().map_err(|_| StoreError::Unavailable)?;
    if !state.records.contains_key(&record.id) {
      return Err(StoreError::NotFound(record.id));
    }

    self.append_journal(record)?;
    state.records.insert(record.id, record.clone());
    state.journal_entries += 1;

    // 件数に比例した閾値で畳み込むので、書き込み量はバッチ全体で線形に収まる
    if state.journal_entries >= state.records.len().max(JOURNAL_COMPACT_MIN) {
      if let Err(e) = self.write_snapshot(&state.records) {
        // 変更はジャーナルに残っているので、コミット自体は成功扱い
        warn!(error = %e, "Journal compaction failed");
      } else {
        state.journal_entries = 0;
      }
    }
    Ok(())
  }
}

/// `records.json` -> `records.json.journal`
fn journal_path_for(path: &Path) -> PathBuf {
  let mut name = path.as_os_str().to_os_string();
  name.push(JOURNAL_SUFFIX);
  PathBuf::from(name)
}

fn parent_dir(path: &Path) -> PathBuf {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}

/// Applies journal entries in order and returns how many were applied.
///
/// A broken last line is a torn append and is skipped.
fn replay_journal(
  journal_path: &Path,
  records: &mut BTreeMap<RecordId, Record>,
) -> Result<usize, StoreError> {
  if !journal_path.exists() {
    return Ok(0);
  }
  let raw = std::fs::read_to_string(journal_path).map_err(|e| io_error(journal_path, e))?;
  let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();

  let mut applied = 0;
  for (i, line) in lines.iter().enumerate() {
    match serde_json::from_str::<Record>(line) {
      Ok(record) => {
        records.insert(record.id, record);
        applied += 1;
      }
      Err(e) if i + 1 == lines.len() => {
        warn!(path = %journal_path.display(), error = %e, "Skipping torn journal tail");
      }
      Err(e) => return Err(json_error(journal_path, e)),
    }
  }
  Ok(applied)
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
  StoreError::Io {
    path: path.to_path_buf(),
    source: Arc::new(e),
  }
}

fn json_error(path: &Path, e: serde_json::Error) -> StoreError {
  StoreError::Json {
    path: path.to_path_buf(),
    source: Arc::new(e),
  }
}
