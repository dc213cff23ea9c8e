// crates/yomigana/src/service.rs

//! YomiganaService: yomigana クレートの統合ファサード。
//!
//! - 辞書管理 (DictionaryManager)
//! - 読み解析 (ReadingAnalyzer)
//! - レコードストア (RecordStore)
//! - 実行時設定 (Settings)
//!
//! ホスト（HTTP API など）からは、この構造体だけを意識すればよい。
//!
//! # バッチの流れ
//!
//! 1. `select` で検索式から対象 ID 集合のスナップショットを取る
//! 2. `Settings::snapshot` で設定のスナップショットを取る
//! 3. `BatchScheduler` を開始し、`step` / `run_to_end` で1件ずつ処理する

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::analyzer::{ReadingAnalyzer, VibratoReadingAnalyzer};
use crate::batch::{BatchScheduler, BatchSummary, NoticeSink, ProgressReporter};
use crate::config::{Settings, YomiganaConfig};
use crate::dictionary::DictionaryManager;
use crate::errors::{BatchError, YomiganaResult};
use crate::models::{Operation, RecordId};
use crate::store::{JsonRecordStore, RecordQuery, RecordStore};

/// yomigana クレートの統合ファサード。
pub struct YomiganaService {
  /// レコードストア
  store: Arc<dyn RecordStore>,

  /// 読み解析器
  analyzer: Arc<dyn ReadingAnalyzer>,

  /// 実行時設定（ホストが切り替える）
  settings: Settings,

  /// 検索式が省略されたときの検索式
  default_query: String,

  /// レコード間の待ち時間
  step_interval: Duration,

  /// 辞書マネージャ（`init` で構築した場合のみ）
  dictionary_manager: Option<DictionaryManager>,
}

impl YomiganaService {
  /// 初期化（設定検証 + 辞書ロード + 解析器構築 + ストア open）
  ///
  /// # 処理フロー
  /// 1. 設定の妥当性を検証
  /// 2. DictionaryManager を構築して辞書をロード（初回はダウンロード）
  /// 3. 辞書種別に合った読み列で VibratoReadingAnalyzer を構築
  /// 4. JSON レコードストアを開く
  ///
  /// # エラー
  /// - 設定が不正
  /// - 辞書ロード失敗
  /// - ストアファイルの読み込み失敗
  pub fn init(config: &YomiganaConfig) -> YomiganaResult<Self> {
    // ConfigError は #[from] で YomiganaError に自動変換
    config.validate()?;

    let preset = config.dictionary_preset();
    let manager = match config.dictionary_cache_dir() {
      Some(dir) => DictionaryManager::with_preset_in(preset, dir),
      None => DictionaryManager::with_preset(preset)?,
    };
    let dict = manager.load()?;
    let analyzer =
      VibratoReadingAnalyzer::from_shared_dictionary(dict, config.dictionary.preset.reading_field());

    let store = JsonRecordStore::open(config.store_path())?;

    info!(
      preset = preset.name(),
      store = %config.store_path().display(),
      default_query = config.default_query(),
      "YomiganaService initialized"
    );

    let mut service = Self::from_parts(
      Arc::new(store),
      Arc::new(analyzer),
      Settings::new(config.annotation_defaults()),
      config.default_query(),
    )
    .with_step_interval(config.step_interval());
    service.dictionary_manager = Some(manager);
    Ok(service)
  }

  /// 構築済みの部品からサービスを組み立てる（辞書を使わないテストや組み込み用）
  pub fn from_parts(
    store: Arc<dyn RecordStore>,
    analyzer: Arc<dyn ReadingAnalyzer>,
    settings: Settings,
    default_query: impl Into<String>,
  ) -> Self {
    Self {
      store,
      analyzer,
      settings,
      default_query: default_query.into(),
      step_interval: Duration::ZERO,
      dictionary_manager: None,
    }
  }

  /// レコード間の待ち時間を設定する
  #[must_use]
  pub fn with_step_interval(mut self, interval: Duration) -> Self {
    self.step_interval = interval;
    self
  }

  /// 検索式に一致するレコード ID を返す。
  ///
  /// `query` が `None` または空白のみの場合はデフォルトの検索式を使う。
  ///
  /// # エラー
  /// - 検索式が不正: `StoreError::InvalidQuery`
  /// - ID 集合の取得失敗: `BatchError::Selection`
  pub fn select(&self, query: Option<&str>) -> YomiganaResult<Vec<RecordId>> {
    let raw = query.filter(|q| !q.trim().is_empty()).unwrap_or(&self.default_query);
    let parsed = RecordQuery::parse(raw)?;
    let ids = self.store.find_ids(&parsed).map_err(BatchError::Selection)?;
    Ok(ids)
  }

  /// 検索式で対象を選び、開始済みのスケジューラを返す。
  ///
  /// # エラー
  /// - `select` のエラー
  /// - 実行時設定を読み取れない
  /// - 対象が0件: `BatchError::EmptySelection`
  pub fn prepare(
    &self,
    operation: Operation,
    query: Option<&str>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> YomiganaResult<BatchScheduler> {
    let ids = self.select(query)?;
    self.prepare_ids(operation, ids, reporter, notices)
  }

  /// ID 集合を直接指定して、開始済みのスケジューラを返す。
  pub fn prepare_ids(
    &self,
    operation: Operation,
    ids: Vec<RecordId>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> YomiganaResult<BatchScheduler> {
    // バッチ開始時に一度だけ読む
    let options = self.settings.snapshot()?;

    let mut scheduler =
      BatchScheduler::new(self.store.clone(), self.analyzer.clone(), reporter, notices)
        .with_step_interval(self.step_interval);
    scheduler.start(operation, ids, options)?;
    Ok(scheduler)
  }

  /// `prepare` して最後まで実行する。
  pub fn run(
    &self,
    operation: Operation,
    query: Option<&str>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> YomiganaResult<BatchSummary> {
    let mut scheduler = self.prepare(operation, query, reporter, notices)?;
    Ok(scheduler.run_to_end()?)
  }

  /// ふりがなを付与する。
  pub fn run_add(
    &self,
    query: Option<&str>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> YomiganaResult<BatchSummary> {
    self.run(Operation::Add, query, reporter, notices)
  }

  /// ふりがなを除去する。
  pub fn run_remove(
    &self,
    query: Option<&str>,
    reporter: Arc<dyn ProgressReporter>,
    notices: Arc<dyn NoticeSink>,
  ) -> YomiganaResult<BatchSummary> {
    self.run(Operation::Remove, query, reporter, notices)
  }

  // ===== アクセサ =====

  /// レコードストアを返す。
  pub fn store(&self) -> &Arc<dyn RecordStore> {
    &self.store
  }

  /// 読み解析器を返す。
  pub fn analyzer(&self) -> &Arc<dyn ReadingAnalyzer> {
    &self.analyzer
  }

  /// 実行時設定を返す。
  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  /// デフォルトの検索式を返す。
  pub fn default_query(&self) -> &str {
    &self.default_query
  }

  /// 内部の DictionaryManager への参照を返す（`init` で構築した場合のみ）。
  pub fn dictionary_manager(&self) -> Option<&DictionaryManager> {
    self.dictionary_manager.as_ref()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// テストモジュール
// ─────────────────────────────────────────────────────────────────────────────
