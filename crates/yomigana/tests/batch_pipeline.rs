//! crates/yomigana/tests/batch_pipeline.rs
//!
//! End-to-end tests of the add/remove pipeline.
//! Uses a stub analyzer so no dictionary download is needed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use yomigana::analyzer::ReadingAnalyzer;
use yomigana::batch::{
  BatchPhase, BatchScheduler, BatchSummary, FailureStage, Notice, NoticeSink, NoopReporter,
  ProgressReporter,
};
use yomigana::config::{AnnotationOptions, Settings};
use yomigana::errors::{AnalyzerError, BatchError};
use yomigana::models::{Analysis, MarkerFlag, Operation, Record, RecordId, Segment};
use yomigana::store::{JsonRecordStore, MemoryRecordStore, RecordStore};
use yomigana::YomiganaService;

/// Dictionary-free analyzer.
///
/// Knows a fixed set of words and counts how often it is called.
/// Input containing `!` fails, to simulate malformed text.
#[derive(Default)]
struct StubAnalyzer {
  calls: AtomicUsize,
}

impl StubAnalyzer {
  fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl ReadingAnalyzer for StubAnalyzer {
  fn analyze(&self, plain: &str, _: &AnnotationOptions) -> Result<Analysis, AnalyzerError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if plain.contains('!') {
      return Err(AnalyzerError::InvalidInput {
        reason: "unexpected `!`".to_string(),
      });
    }

    let words: HashMap<&str, &str> =
      [("食べる", "たべる"), ("日本語", "にほんご"), ("猫", "ねこ"), ("犬", "いぬ")].into();

    let mut segments = Vec::new();
    let mut rest = plain;
    'outer: while !rest.is_empty() {
      for (surface, reading) in &words {
        if let Some(tail) = rest.strip_prefix(surface) {
          segments.push(Segment::with_reading(*surface, *reading));
          rest = tail;
          continue 'outer;
        }
      }
      let mut chars = rest.chars();
      if let Some(c) = chars.next() {
        segments.push(Segment::plain(c.to_string()));
      }
      rest = chars.as_str();
    }
    Ok(Analysis::new(segments))
  }
}

/// Records every event for later assertions.
#[derive(Default)]
struct Recorder {
  started: Mutex<Vec<usize>>,
  updates: Mutex<Vec<(usize, usize, String)>>,
  finished: Mutex<Vec<BatchSummary>>,
  notices: Mutex<Vec<Notice>>,
}

impl ProgressReporter for Recorder {
  fn on_start(&self, _operation: Operation, total: usize) {
    self.started.lock().unwrap().push(total);
  }

  fn on_update(&self, processed: usize, total: usize, label: &str) {
    self.updates.lock().unwrap().push((processed, total, label.to_string()));
  }

  fn on_finish(&self, summary: &BatchSummary) {
    self.finished.lock().unwrap().push(summary.clone());
  }
}

impl NoticeSink for Recorder {
  fn notify(&self, notice: &Notice) {
    self.notices.lock().unwrap().push(notice.clone());
  }
}

fn ids(raw: &[u64]) -> Vec<RecordId> {
  raw.iter().copied().map(RecordId::new).collect()
}

fn scheduler(
  store: Arc<MemoryRecordStore>,
  analyzer: Arc<StubAnalyzer>,
  recorder: Arc<Recorder>,
) -> BatchScheduler {
  BatchScheduler::new(store, analyzer, recorder.clone(), recorder)
}

fn run(
  store: &Arc<MemoryRecordStore>,
  analyzer: &Arc<StubAnalyzer>,
  operation: Operation,
  targets: &[u64],
) -> (BatchSummary, Arc<Recorder>) {
  let recorder = Arc::new(Recorder::default());
  let mut s = scheduler(store.clone(), analyzer.clone(), recorder.clone());
  s.start(operation, ids(targets), AnnotationOptions::default()).unwrap();
  (s.run_to_end().unwrap(), recorder)
}

#[test]
fn add_twice_yields_same_text_as_once() {
  let store = Arc::new(MemoryRecordStore::with_records([Record::new(1, "日本語を食べる")]));
  let analyzer = Arc::new(StubAnalyzer::default());

  run(&store, &analyzer, Operation::Add, &[1]);
  let once = store.get(RecordId::new(1)).unwrap();
  assert_eq!(once.primary_text, "日本語[にほんご]を 食[た]べる");
  assert_eq!(once.marker, MarkerFlag::Annotated);

  let (summary, _) = run(&store, &analyzer, Operation::Add, &[1]);
  let twice = store.get(RecordId::new(1)).unwrap();
  assert_eq!(twice, once);
  assert_eq!(summary.skipped_ineligible, 1);
}

#[test]
fn remove_after_add_restores_original_text() {
  let originals = ["食べる", "猫と犬", "<b>日本語</b>は難しい", "ひらがなだけ"];
  let store = Arc::new(MemoryRecordStore::with_records(
    originals.iter().enumerate().map(|(i, t)| Record::new(i as u64 + 1, *t)),
  ));
  let analyzer = Arc::new(StubAnalyzer::default());

  run(&store, &analyzer, Operation::Add, &[1, 2, 3, 4]);
  run(&store, &analyzer, Operation::Remove, &[1, 2, 3, 4]);

  for (i, original) in originals.iter().enumerate() {
    let rec = store.get(RecordId::new(i as u64 + 1)).unwrap();
    assert_eq!(rec.primary_text, *original);
    assert_eq!(rec.marker, MarkerFlag::Unmarked);
  }
}

#[test]
fn annotated_record_is_never_sent_to_analyzer() {
  let store = Arc::new(MemoryRecordStore::with_records([
    Record::new(1, "猫[ねこ]").with_marker(MarkerFlag::Annotated),
    Record::new(2, "犬[いぬ]").with_marker(MarkerFlag::Annotated),
  ]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, _) = run(&store, &analyzer, Operation::Add, &[1, 2]);

  assert_eq!(analyzer.calls(), 0);
  assert_eq!(summary.skipped_ineligible, 2);
  assert_eq!(store.commit_count(), 0);
}

#[test]
fn unchanged_output_skips_commit_and_keeps_marker() {
  let store = Arc::new(MemoryRecordStore::with_records([Record::new(1, "ひらがな")]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, recorder) = run(&store, &analyzer, Operation::Add, &[1]);

  assert_eq!(summary.unchanged, 1);
  assert_eq!(store.commit_count(), 0);
  assert_eq!(store.get(RecordId::new(1)).unwrap().marker, MarkerFlag::Unmarked);

  let notices = recorder.notices.lock().unwrap();
  assert_eq!(notices.len(), 1);
  assert!(notices[0].to_string().starts_with("Nothing to generate"));
}

#[test]
fn remove_on_unmarked_record_is_a_no_op() {
  let store = Arc::new(MemoryRecordStore::with_records([Record::new(1, "食べる")]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, recorder) = run(&store, &analyzer, Operation::Remove, &[1]);

  assert_eq!(summary.skipped_ineligible, 1);
  assert_eq!(store.commit_count(), 0);
  assert!(recorder.notices.lock().unwrap().is_empty());
  assert_eq!(store.get(RecordId::new(1)).unwrap().primary_text, "食べる");
}

#[test]
fn remove_on_marked_record_without_markup_reports_nothing_to_delete() {
  let store = Arc::new(MemoryRecordStore::with_records([
    Record::new(1, "食べる").with_marker(MarkerFlag::Annotated),
  ]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, recorder) = run(&store, &analyzer, Operation::Remove, &[1]);

  assert_eq!(summary.unchanged, 1);
  let notices = recorder.notices.lock().unwrap();
  assert!(notices[0].to_string().starts_with("No furigana found to delete"));
}

#[test]
fn analyzer_failure_is_isolated_to_one_record() {
  let store = Arc::new(MemoryRecordStore::with_records([
    Record::new(1, "猫"),
    Record::new(2, "犬!"),
    Record::new(3, "食べる"),
    Record::new(4, "日本語"),
  ]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, recorder) = run(&store, &analyzer, Operation::Add, &[1, 2, 3, 4]);

  assert_eq!(summary.phase, BatchPhase::Completed);
  assert_eq!(summary.processed, 4);
  assert_eq!(summary.committed, 3);
  assert_eq!(summary.failures.len(), 1);
  assert_eq!(summary.failures[0].record_id, RecordId::new(2));
  assert_eq!(summary.failures[0].stage, FailureStage::Analyze);

  assert_eq!(store.get(RecordId::new(3)).unwrap().marker, MarkerFlag::Annotated);
  assert_eq!(store.get(RecordId::new(4)).unwrap().marker, MarkerFlag::Annotated);
  assert_eq!(store.get(RecordId::new(2)).unwrap().primary_text, "犬!");

  let failures: Vec<_> = recorder
    .notices
    .lock()
    .unwrap()
    .iter()
    .filter(|n| matches!(n, Notice::RecordFailed(_)))
    .cloned()
    .collect();
  assert_eq!(failures.len(), 1);
  assert!(failures[0].to_string().contains("record 2"));
}

#[test]
fn commit_failure_is_isolated_and_marker_untouched() {
  let store = Arc::new(MemoryRecordStore::with_records([Record::new(1, "猫"), Record::new(2, "犬")]));
  store.fail_commits_for(RecordId::new(1), "locked by host");
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, _) = run(&store, &analyzer, Operation::Add, &[1, 2]);

  assert_eq!(summary.failures.len(), 1);
  assert_eq!(summary.failures[0].stage, FailureStage::Commit);
  assert!(summary.failures[0].message.contains("locked by host"));
  assert_eq!(store.get(RecordId::new(1)).unwrap().marker, MarkerFlag::Unmarked);
  assert_eq!(store.get(RecordId::new(2)).unwrap().marker, MarkerFlag::Annotated);
}

#[test]
fn missing_record_is_reported_as_load_failure() {
  let store = Arc::new(MemoryRecordStore::with_records([Record::new(1, "猫")]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, _) = run(&store, &analyzer, Operation::Add, &[1, 99]);

  assert_eq!(summary.processed, 2);
  assert_eq!(summary.failures[0].record_id, RecordId::new(99));
  assert_eq!(summary.failures[0].stage, FailureStage::Load);
}

#[test]
fn cancel_after_p_records_stops_with_partial_count() {
  let store = Arc::new(MemoryRecordStore::with_records((1..=5).map(|i| Record::new(i, "猫"))));
  let analyzer = Arc::new(StubAnalyzer::default());
  let recorder = Arc::new(Recorder::default());

  let mut s = scheduler(store.clone(), analyzer, recorder.clone());
  s.start(Operation::Add, ids(&[1, 2, 3, 4, 5]), AnnotationOptions::default()).unwrap();

  assert_eq!(s.step(), BatchPhase::Running);
  assert_eq!(s.step(), BatchPhase::Running);
  s.cancel_flag().cancel();
  assert_eq!(s.step(), BatchPhase::Cancelled);
  assert_eq!(s.step(), BatchPhase::Cancelled);

  let summary = s.summary().unwrap();
  assert_eq!(summary.phase, BatchPhase::Cancelled);
  assert_eq!(summary.processed, 2);
  assert_eq!(summary.total, 5);
  assert_eq!(store.commit_count(), 2);
  assert_eq!(store.get(RecordId::new(3)).unwrap().marker, MarkerFlag::Unmarked);

  let finished = recorder.finished.lock().unwrap();
  assert_eq!(finished.len(), 1);
  assert_eq!(finished[0].processed, 2);
}

#[test]
fn two_record_example_annotates_r1_and_skips_r2() {
  let store = Arc::new(MemoryRecordStore::with_records([
    Record::new(1, "食べる"),
    Record::new(2, "猫[ねこ]").with_marker(MarkerFlag::Annotated),
  ]));
  let analyzer = Arc::new(StubAnalyzer::default());

  let (summary, recorder) = run(&store, &analyzer, Operation::Add, &[1, 2]);

  let r1 = store.get(RecordId::new(1)).unwrap();
  assert_eq!(r1.primary_text, "食[た]べる");
  assert_eq!(r1.marker, MarkerFlag::Annotated);
  assert_eq!(store.get(RecordId::new(2)).unwrap().primary_text, "猫[ねこ]");

  assert_eq!(summary.processed, 2);
  assert_eq!(summary.total, 2);
  assert_eq!(summary.operation, Operation::Add);

  assert_eq!(*recorder.started.lock().unwrap(), vec![2]);
  let updates = recorder.updates.lock().unwrap();
  assert_eq!(
    *updates,
    vec![
      (1, 2, "Processed 1 / 2".to_string()),
      (2, 2, "Processed 2 / 2".to_string()),
    ]
  );
}

#[test]
fn legacy_marker_spelling_is_treated_as_unmarked() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("records.json");
  std::fs::write(
    &path,
    r#"[
      {"id": 1, "category": "Words", "primary_text": "猫", "marker": "arutoapple"},
      {"id": 2, "category": "Words", "primary_text": "犬", "marker": ""}
    ]"#,
  )
  .unwrap();

  let store = Arc::new(JsonRecordStore::open(&path).unwrap());
  let mut s = BatchScheduler::new(
    store.clone(),
    Arc::new(StubAnalyzer::default()),
    Arc::new(NoopReporter),
    Arc::new(NoopReporter),
  );
  s.start(Operation::Add, ids(&[1, 2]), AnnotationOptions::default()).unwrap();
  let summary = s.run_to_end().unwrap();

  assert_eq!(summary.committed, 2);
  let reopened = JsonRecordStore::open(&path).unwrap();
  let rec = reopened.load_record(RecordId::new(1)).unwrap();
  assert_eq!(rec.primary_text, "猫[ねこ]");
  assert_eq!(rec.marker, MarkerFlag::Annotated);
}

#[test]
fn legacy_annotated_spelling_can_be_removed() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("records.json");
  std::fs::write(
    &path,
    r#"[{"id": 1, "category": "Words", "primary_text": "猫[ねこ]", "marker": "toaruapple"}]"#,
  )
  .unwrap();

  let store = Arc::new(JsonRecordStore::open(&path).unwrap());
  assert_eq!(store.load_record(RecordId::new(1)).unwrap().marker, MarkerFlag::Annotated);

  let analyzer = Arc::new(StubAnalyzer::default());
  let mut s = BatchScheduler::new(
    store.clone(),
    analyzer.clone(),
    Arc::new(NoopReporter),
    Arc::new(NoopReporter),
  );
  s.start(Operation::Remove, ids(&[1]), AnnotationOptions::default()).unwrap();
  let summary = s.run_to_end().unwrap();

  assert_eq!(summary.committed, 1);
  assert_eq!(summary.skipped_ineligible, 0);
  assert_eq!(analyzer.calls(), 0);

  let reopened = JsonRecordStore::open(&path).unwrap();
  let rec = reopened.load_record(RecordId::new(1)).unwrap();
  assert_eq!(rec.primary_text, "猫");
  assert_eq!(rec.marker, MarkerFlag::Unmarked);
  assert!(std::fs::read_to_string(&path).unwrap().contains("\"UNMARKED\""));
}

#[test]
fn legacy_annotated_spelling_is_not_annotated_twice() {
  let store = Arc::new(MemoryRecordStore::new());
  let analyzer = Arc::new(StubAnalyzer::default());
  let rec: Record = serde_json::from_str(
    r#"{"id": 1, "category": "Words", "primary_text": "猫[ねこ]", "marker": "toaruapple"}"#,
  )
  .unwrap();
  store.insert(rec).unwrap();

  let mut s = BatchScheduler::new(
    store.clone(),
    analyzer.clone(),
    Arc::new(NoopReporter),
    Arc::new(NoopReporter),
  );
  s.start(Operation::Add, ids(&[1]), AnnotationOptions::default()).unwrap();
  let summary = s.run_to_end().unwrap();

  assert_eq!(summary.skipped_ineligible, 1);
  assert_eq!(analyzer.calls(), 0);
  assert_eq!(store.get(RecordId::new(1)).unwrap().primary_text, "猫[ねこ]");
}

#[test]
fn service_runs_against_json_store() {
  let temp_dir = TempDir::new().unwrap();
  let path = temp_dir.path().join("records.json");
  let store = JsonRecordStore::open(&path).unwrap();
  store.insert(Record::new(1, "日本語").with_category("Words")).unwrap();
  store.insert(Record::new(2, "猫").with_category("Other")).unwrap();

  let service = YomiganaService::from_parts(
    Arc::new(store),
    Arc::new(StubAnalyzer::default()),
    Settings::default(),
    "deck:Words",
  );

  let summary = service.run_add(None, Arc::new(NoopReporter), Arc::new(NoopReporter)).unwrap();
  assert_eq!(summary.total, 1);
  assert!(summary.is_clean());

  let reopened = JsonRecordStore::open(&path).unwrap();
  assert_eq!(reopened.load_record(RecordId::new(1)).unwrap().primary_text, "日本語[にほんご]");
  assert_eq!(reopened.load_record(RecordId::new(2)).unwrap().primary_text, "猫");
}

#[test]
fn empty_selection_does_not_start() {
  let store = Arc::new(MemoryRecordStore::new());
  let recorder = Arc::new(Recorder::default());
  let service = YomiganaService::from_parts(
    store,
    Arc::new(StubAnalyzer::default()),
    Settings::default(),
    "category:Words",
  );

  let err = service.run_add(None, recorder.clone(), recorder.clone()).unwrap_err();
  assert!(matches!(err, yomigana::YomiganaError::Batch(BatchError::EmptySelection)));
  assert!(recorder.started.lock().unwrap().is_empty());
}
