//! HTTPハンドラー定義

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use tracing::{debug, error, info};
use yomigana::config::AnnotationOptions;
use yomigana::models::Operation;

use crate::errors::ApiError;
use crate::models::{BatchStatus, CancelResponse, RunAccepted, RunRequest, SettingsUpdate};

use super::state::AppState;

/// バッチを開始する共通処理
///
/// 前のバッチの停止待ちが発生しうるため spawn_blocking で実行する。
async fn start_batch(
  state: AppState,
  operation: Operation,
  body: Bytes,
) -> Result<(StatusCode, Json<RunAccepted>), ApiError> {
  let request = RunRequest::from_body(&body).map_err(ApiError::invalid_input)?;
  debug!(%operation, query = ?request.query, "バッチ開始リクエストを受信");

  let service = state.service.clone();
  let accepted = tokio::task::spawn_blocking(move || service.start(operation, request.query))
    .await
    .map_err(|e| {
      error!(error = %e, "spawn_blocking エラー");
      ApiError::internal("処理の実行に失敗しました")
    })??;

  info!(%operation, total = accepted.total, "バッチを開始しました");
  Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// POST /furigana/add エンドポイント
///
/// 検索式に一致するレコードにふりがなを付与するバッチを開始する。
///
/// # Request Body（省略可）
/// ```json
/// { "query": "category:Words" }
/// ```
///
/// # Response
/// - 202 Accepted: バッチ開始
/// - 400 Bad Request: ボディまたは検索式が不正
/// - 404 Not Found: 対象レコードが0件
/// - 500 Internal Server Error: 内部エラー
pub async fn post_add(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<(StatusCode, Json<RunAccepted>), ApiError> {
  start_batch(state, Operation::Add, body).await
}

/// POST /furigana/remove エンドポイント
///
/// ふりがなを除去するバッチを開始する。リクエストとレスポンスは `post_add` と同じ。
pub async fn post_remove(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<(StatusCode, Json<RunAccepted>), ApiError> {
  start_batch(state, Operation::Remove, body).await
}

/// POST /furigana/cancel エンドポイント
///
/// 実行中のバッチに中断を要求する。処理中のレコードは最後まで処理される。
///
/// バッチ開始処理とロックを共有するため spawn_blocking で実行する。
pub async fn post_cancel(
  State(state): State<AppState>,
) -> Result<Json<CancelResponse>, ApiError> {
  let service = state.service.clone();
  let cancelled = tokio::task::spawn_blocking(move || service.cancel()).await.map_err(|e| {
    error!(error = %e, "spawn_blocking エラー");
    ApiError::internal("処理の実行に失敗しました")
  })?;

  if cancelled {
    info!("バッチの中断を要求しました");
  }
  Ok(Json(CancelResponse { cancelled }))
}

/// GET /furigana/status エンドポイント
pub async fn get_status(State(state): State<AppState>) -> Json<BatchStatus> {
  Json(state.service.status())
}

/// GET /settings エンドポイント
pub async fn get_settings(
  State(state): State<AppState>,
) -> Result<Json<AnnotationOptions>, ApiError> {
  Ok(Json(state.service.settings()?))
}

/// PUT /settings エンドポイント
///
/// 指定された項目だけを変更する。実行中のバッチには反映されず、次のバッチから有効。
pub async fn put_settings(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<Json<AnnotationOptions>, ApiError> {
  let update: SettingsUpdate = serde_json::from_slice(&body)
    .map_err(|e| ApiError::invalid_input(format!("設定の形式が不正です: {e}")))?;
  Ok(Json(state.service.update_settings(update)?))
}

/// ヘルスチェックエンドポイント
///
/// サーバーが稼働しているかを確認する。
pub async fn health_check() -> &'static str {
  "OK"
}
