//! yomigana crate example
//!
//! Seeds a JSON record store, adds furigana to the `Words` category, prints the
//! result and removes the furigana again.
//!
//! ```bash
//! cargo run -p yomigana --example annotate_store            # temporary store
//! cargo run -p yomigana --example annotate_store config.json
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use yomigana::batch::TracingReporter;
use yomigana::models::Record;
use yomigana::store::{JsonRecordStore, RecordQuery};
use yomigana::{YomiganaConfig, YomiganaService};

/// Application common result type
type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

fn sample_records() -> Vec<Record> {
  vec![
    Record::new(1u64, "日本語を勉強する").with_category("Words"),
    Record::new(2u64, "寿司を食べる").with_category("Words"),
    Record::new(3u64, "ひらがなだけ").with_category("Words"),
    Record::new(4u64, "東京タワー").with_category("Places"),
  ]
}

fn print_records(service: &YomiganaService, title: &str) -> AppResult<()> {
  println!("===== {title} =====");
  let store = service.store();
  for id in store.find_ids(&RecordQuery::all())? {
    let record = store.load_record(id)?;
    println!("[{}] {:<8} {:<10} {}", record.id, record.category, record.marker, record.primary_text);
  }
  Ok(())
}

fn main() -> AppResult<()> {
  let temp_dir = tempfile::tempdir()?;
  let config = match std::env::args().nth(1) {
    Some(path) => YomiganaConfig::from_json_file(path)?,
    None => {
      let mut config = YomiganaConfig::default();
      config.store.path = temp_dir.path().join("records.json");
      config
    }
  };

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level().as_filter_str())),
    )
    .init();

  // Seed only an empty store so that an existing file is never overwritten
  let seed = JsonRecordStore::open(config.store_path())?;
  if seed.is_empty() {
    for record in sample_records() {
      seed.insert(record)?;
    }
  }
  drop(seed);

  // 初回は辞書をダウンロードする
  let service = YomiganaService::init(&config)?;
  print_records(&service, "before")?;

  let reporter = Arc::new(TracingReporter);
  let summary = service.run_add(None, reporter.clone(), reporter.clone())?;
  println!("add: committed={} unchanged={}", summary.committed, summary.unchanged);
  print_records(&service, "after add")?;

  // Running add again is a no-op for annotated records
  let summary = service.run_add(None, reporter.clone(), reporter.clone())?;
  println!("add again: skipped={}", summary.skipped_ineligible);

  let summary = service.run_remove(None, reporter.clone(), reporter)?;
  println!("remove: committed={}", summary.committed);
  print_records(&service, "after remove")?;

  Ok(())
}
