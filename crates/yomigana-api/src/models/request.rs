//! リクエストモデル定義

use serde::Deserialize;
use yomigana::config::{AnnotationOptions, MarkupStyle};

/// ふりがな付与・除去リクエスト
///
/// ボディ自体を省略した場合も `query: None` として扱う。
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
  /// 検索式（省略時はサーバー設定のデフォルト検索式）
  #[serde(default)]
  pub query: Option<String>,
}

impl RunRequest {
  /// 空ボディを許容してリクエストを解釈する
  ///
  /// # Errors
  /// JSON として不正な場合はエラーメッセージを返す
  pub fn from_body(body: &[u8]) -> Result<Self, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::default());
    }
    serde_json::from_slice(body).map_err(|e| e.to_string())
  }
}

/// 設定変更リクエスト（指定された項目だけを変更する）
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
  /// 数字に読みを付けない
  #[serde(default)]
  pub ignore_numbers: Option<bool>,
  /// マークアップ形式
  #[serde(default)]
  pub markup_style: Option<MarkupStyle>,
}

impl SettingsUpdate {
  /// 現在の設定に変更を適用する
  pub fn apply_to(&self, options: &mut AnnotationOptions) {
    if let Some(ignore_numbers) = self.ignore_numbers {
      options.ignore_numbers = ignore_numbers;
    }
    if let Some(markup_style) = self.markup_style {
      options.markup_style = markup_style;
    }
  }
}
