//! yomigana ふりがなバッチ処理ライブラリー
//!
//! vibrato-rkyv を用いて日本語テキストにふりがなを付与・除去する。
//! 処理済みマーカーにより、何度実行しても結果が変わらない（冪等な）バッチを提供する。

/// 解析モジュール - ReadingAnalyzer トレイトと vibrato-rkyv による実装
pub mod analyzer;

/// バッチモジュール - BatchScheduler, 進捗報告, 集計結果
pub mod batch;

/// コーデックモジュール - ふりがなマークアップの生成と除去
pub mod codec;

/// 設定モジュール - YomiganaConfig, Settings 等の設定構造体を定義
pub mod config;

/// 辞書モジュール - 形態素解析用辞書の管理・ロード機能を提供
pub mod dictionary;

/// エラーモジュール - YomiganaError, YomiganaResult等のエラー型を定義
pub mod errors;

/// マーカーモジュール - レコードごとの適用済みフラグの判定と遷移
pub mod marker;

/// データモデルモジュール - Record, Operation, Analysis等のデータ構造を定義
pub mod models;

/// サービスモジュール - YomiganaService等の上位レベルAPIを提供
pub mod service;

/// ストアモジュール - RecordStore トレイトとメモリ・JSON ファイル実装
pub mod store;

/// 再エクスポート
pub use config::{AnnotationOptions, MarkupStyle, Settings, YomiganaConfig};
pub use errors::{YomiganaError, YomiganaResult};
pub use models::{MarkerFlag, Operation, Record, RecordId};
pub use service::YomiganaService;
