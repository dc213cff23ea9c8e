//! エラー定義

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use vibrato_rkyv::dictionary::PresetDictionaryKind;

use crate::models::RecordId;

/// 設定（YomiganaConfig / Settings）関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// store.default_query が空
  #[error("store.default_query に検索式を指定してください")]
  EmptyDefaultQuery,

  /// store.path がディレクトリを指している
  #[error("store.path はファイルを指す必要があります: path={path:?}")]
  StorePathIsDirectory {
    /// 不正なパス
    path: PathBuf,
  },

  /// batch.step_interval_ms が許容範囲外
  #[error("batch.step_interval_ms は {max} 以下である必要があります: actual={actual}")]
  InvalidStepInterval {
    /// 許容される最大値（ミリ秒）
    max: u64,
    /// 実際に指定された値（ミリ秒）
    actual: u64,
  },

  /// dictionary.cache_dir が「存在するディレクトリ」でない（ファイルである等）
  #[error("dictionary.cache_dir がディレクトリではありません: path={path:?}")]
  InvalidDictionaryCacheDir {
    /// 不正なパス
    path: PathBuf,
  },

  /// dictionary.cache_dir の作成に失敗
  #[error("dictionary.cache_dir の作成に失敗しました: path={path:?}, error={source}")]
  DictionaryCacheDirCreationFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// 設定ファイルの読み込みに失敗
  #[error("設定ファイルを読み込めません: path={path:?}, error={source}")]
  Read {
    /// 設定ファイルのパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// 設定ファイルの解析に失敗
  #[error("設定ファイルの解析に失敗しました: {0}")]
  Parse(Arc<serde_json::Error>),

  /// 実行時設定（Settings）を読み取れない（ロックが poison 状態）
  #[error("実行時設定を読み取れません")]
  SettingsUnavailable,
}

/// 辞書関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum DictionaryError {
  /// キャッシュディレクトリーが見つからない
  #[error("辞書キャッシュディレクトリーが見つかりません")]
  CacheDirNotFound,

  /// キャッシュディレクトリーの作成失敗
  #[error("辞書キャッシュディレクトリーの作成に失敗しました: {0}")]
  CacheDirCreationFailed(Arc<io::Error>),

  /// 指定された辞書が見つからない
  #[error("指定された辞書が見つかりません: {0}")]
  DictionaryNotFound(String),

  /// 辞書パスが不正または辞書種別が不正
  #[error("辞書パスまたは辞書種別が不正です: path={0}, preset_kind={1:?}")]
  InvalidPathOrInvalidPresetKind(PathBuf, Option<PresetDictionaryKind>),

  /// vibrato-rkyv による辞書のロード失敗
  #[error("vibrato-rkyv 辞書ロードエラー: {0}")]
  VibratoLoad(Arc<dyn std::error::Error + Send + Sync + 'static>),

  /// vibrato-rkyv のプリセット辞書のダウンロード失敗
  #[error("vibrato-rkyv プリセット辞書ダウンロード失敗: {0}")]
  PresetDictDownloadFailed(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

/// 読み解析（Analyzer Adapter）のエラー
///
/// バッチ中はレコード単位で捕捉され、バッチ全体は中断しない。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum AnalyzerError {
  /// 辞書起因のエラー
  #[error("辞書エラー: {0}")]
  Dictionary(#[from] DictionaryError),

  /// 入力テキストが不正
  #[error("解析対象の入力テキストが不正: {reason}")]
  InvalidInput {
    /// 不正の理由
    reason: String,
  },

  /// 入力テキストが長すぎる
  #[error("解析対象のテキストが長すぎます: {actual} バイト（最大: {max} バイト）")]
  TextTooLong {
    /// 実際のバイト数
    actual: usize,
    /// 許容される最大バイト数
    max: usize,
  },
}

/// レコードストア関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StoreError {
  /// レコードが存在しない
  #[error("レコードが見つかりません: id={0}")]
  NotFound(RecordId),

  /// 検索式が不正
  #[error("検索式が不正です: query={query:?}, reason={reason}")]
  InvalidQuery {
    /// 入力された検索式
    query: String,
    /// 不正の理由
    reason: String,
  },

  /// ストアファイルの読み書きに失敗
  #[error("ストアファイルの入出力に失敗しました: path={path:?}, error={source}")]
  Io {
    /// 対象パス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// ストアファイルの JSON 変換に失敗
  #[error("ストアファイルの JSON 変換に失敗しました: path={path:?}, error={source}")]
  Json {
    /// 対象パス
    path: PathBuf,
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// 書き込みが拒否された
  #[error("レコードの書き込みが拒否されました: id={id}, reason={reason}")]
  WriteRejected {
    /// 対象レコード
    id: RecordId,
    /// 拒否の理由
    reason: String,
  },

  /// ストア内部のロックが poison 状態
  #[error("レコードストアが利用できません")]
  Unavailable,
}

/// レコード単位の処理エラー
///
/// `BatchScheduler` が捕捉し、通知として報告した後に次のレコードへ進む。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum RecordError {
  /// レコードの読み込み失敗
  #[error("読み込みに失敗しました: {0}")]
  Load(StoreError),

  /// 読み解析の失敗
  #[error("読み解析に失敗しました: {0}")]
  Analyze(#[from] AnalyzerError),

  /// レコードの書き込み失敗
  #[error("書き込みに失敗しました: {0}")]
  Commit(StoreError),
}

/// バッチ全体に関わるエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum BatchError {
  /// 対象レコードが0件（バッチは開始しない）
  #[error("対象となるレコードがありません")]
  EmptySelection,

  /// 既にバッチが実行中
  #[error("バッチは既に実行中です")]
  AlreadyRunning,

  /// バッチが開始されていない
  #[error("バッチが開始されていません")]
  NotStarted,

  /// 対象 ID 集合の取得に失敗
  #[error("対象レコードの取得に失敗しました: {0}")]
  Selection(StoreError),

  /// 実行時設定の読み取りに失敗
  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// 統合エラー
/// 本クレートの外部に公開するエラー用 API はこのエラーを返すこと
/// `YomiganaResult<T>` = `Result<T, YomiganaError>` として使用する
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum YomiganaError {
  /// 辞書関連エラー
  #[error(transparent)]
  Dictionary(#[from] DictionaryError),

  /// 読み解析関連エラー
  #[error(transparent)]
  Analyzer(#[from] AnalyzerError),

  /// レコードストア関連エラー
  #[error(transparent)]
  Store(#[from] StoreError),

  /// バッチ関連エラー
  #[error(transparent)]
  Batch(#[from] BatchError),

  /// 設定エラー
  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// yomigana クレートの標準 Result 型エイリアス
pub type YomiganaResult<T> = Result<T, YomiganaError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_error_wraps_analyzer_error() {
    let err: RecordError = AnalyzerError::InvalidInput {
      reason: "NUL".to_string(),
    }
    .into();
    assert!(matches!(err, RecordError::Analyze(_)));
    assert!(err.to_string().contains("NUL"));
  }

  #[test]
  fn batch_error_converts_into_yomigana_error() {
    let err: YomiganaError = BatchError::EmptySelection.into();
    assert!(matches!(
      err,
      YomiganaError::Batch(BatchError::EmptySelection)
    ));
  }

  #[test]
  fn store_error_message_contains_record_id() {
    let err = StoreError::NotFound(RecordId::new(42));
    assert!(err.to_string().contains("42"));
  }
}
