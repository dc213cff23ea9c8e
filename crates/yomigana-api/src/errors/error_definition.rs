//! APIエラー定義

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// yomigana クレートのエラー型をインポート
use yomigana::errors::{AnalyzerError, BatchError, StoreError, YomiganaError};

/// エラーの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
  /// 入力値が無効
  InvalidInput,
  /// 対象レコードが0件
  EmptySelection,
  /// 内部エラー
  Internal,
  /// 設定エラー
  Config,
}

impl ApiErrorKind {
  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidInput => "invalid_input",
      Self::EmptySelection => "empty_selection",
      Self::Internal => "internal_error",
      Self::Config => "config_error",
    }
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    match self {
      Self::InvalidInput => StatusCode::BAD_REQUEST,
      Self::EmptySelection => StatusCode::NOT_FOUND,
      Self::Internal | Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// APIエラー
#[derive(Debug, Error)]
pub enum ApiError {
  /// 入力値が無効
  #[error("入力値が無効です: {0}")]
  InvalidInput(String),

  /// 対象レコードが0件（バッチは開始しない）
  #[error("対象となるレコードがありません: query={0:?}")]
  EmptySelection(Option<String>),

  /// 内部エラー
  #[error("内部エラー: {0}")]
  Internal(String),

  /// 設定エラー
  #[error("設定エラー: {0}")]
  Config(String),
}

impl ApiError {
  /// エラーの種類を取得
  #[must_use]
  pub fn kind(&self) -> ApiErrorKind {
    match self {
      Self::InvalidInput(_) => ApiErrorKind::InvalidInput,
      Self::EmptySelection(_) => ApiErrorKind::EmptySelection,
      Self::Internal(_) => ApiErrorKind::Internal,
      Self::Config(_) => ApiErrorKind::Config,
    }
  }

  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    self.kind().code()
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    self.kind().status()
  }

  /// 無効な入力エラーを作成
  #[must_use]
  pub fn invalid_input(message: impl Into<String>) -> Self {
    Self::InvalidInput(message.into())
  }

  /// 対象0件エラーを作成
  #[must_use]
  pub fn empty_selection(query: Option<String>) -> Self {
    Self::EmptySelection(query)
  }

  /// 内部エラーを作成
  #[must_use]
  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal(message.into())
  }

  /// 設定エラーを作成
  #[must_use]
  pub fn config(message: impl Into<String>) -> Self {
    Self::Config(message.into())
  }
}

/// エラーレスポンスのJSON構造
#[derive(Serialize)]
struct ErrorResponse {
  error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
  code: &'static str,
  message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = ErrorResponse {
      error: ErrorBody {
        code: self.code(),
        message: self.to_string(),
      },
    };

    (status, Json(body)).into_response()
  }
}

/// YomiganaError から ApiError への変換
///
/// ドメイン層のエラーを API 層のエラーにマッピングする。
impl From<YomiganaError> for ApiError {
  fn from(err: YomiganaError) -> Self {
    match err {
      YomiganaError::Batch(BatchError::EmptySelection) => ApiError::empty_selection(None),
      YomiganaError::Store(StoreError::InvalidQuery { query, reason }) => {
        ApiError::invalid_input(format!("invalid query {query:?}: {reason}"))
      }
      YomiganaError::Analyzer(
        AnalyzerError::InvalidInput { .. } | AnalyzerError::TextTooLong { .. },
      ) => ApiError::invalid_input(err.to_string()),
      YomiganaError::Dictionary(_) | YomiganaError::Analyzer(AnalyzerError::Dictionary(_)) => {
        ApiError::config(format!("dictionary error: {err}"))
      }
      YomiganaError::Config(err) | YomiganaError::Batch(BatchError::Config(err)) => {
        ApiError::config(err.to_string())
      }
      YomiganaError::Store(_) | YomiganaError::Batch(_) => {
        ApiError::internal(format!("internal error: {err}"))
      }
      // #[non_exhaustive] な enum のため、将来追加されるバリアントに対応
      _ => ApiError::internal(format!("unknown error: {err}")),
    }
  }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
