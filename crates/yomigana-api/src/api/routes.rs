//! ルーター定義

use axum::{
  Router,
  routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers::{
  get_settings, get_status, health_check, post_add, post_cancel, post_remove, put_settings,
};
use super::state::AppState;
use crate::errors::ApiError;

/// APIルーターを作成する
///
/// # Arguments
/// * `state` - アプリケーション状態
///
/// # Returns
/// 設定済みの Router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    .route("/furigana/add", post(post_add))
    .route("/furigana/remove", post(post_remove))
    .route("/furigana/cancel", post(post_cancel))
    .route("/furigana/status", get(get_status))
    .route("/settings", get(get_settings).put(put_settings))
    .route("/health", get(health_check))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// サーバーを起動する
///
/// Ctrl-C を受けると新規接続の受付を止め、実行中のバッチを中断してから終了する。
///
/// # Arguments
/// * `state` - アプリケーション状態
///
/// # Errors
/// サーバーの起動に失敗した場合にエラーを返す
pub async fn run_server(state: AppState) -> crate::errors::Result<()> {
  let addr = state.config.bind_addr.clone();
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .map_err(|e| ApiError::config(format!("バインドに失敗しました: {}", e)))?;

  tracing::info!("サーバーを起動します: http://{}", addr);

  let service = state.service.clone();
  let router = create_router(state);

  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| ApiError::internal(format!("サーバーエラー: {}", e)))?;

  // ワーカースレッドの join はブロッキング
  tokio::task::spawn_blocking(move || service.shutdown())
    .await
    .map_err(|e| ApiError::internal(format!("終了処理に失敗しました: {}", e)))?;

  tracing::info!("サーバーを停止しました");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "シグナルの待ち受けに失敗しました");
    std::future::pending::<()>().await;
  }
  tracing::info!("終了シグナルを受信しました");
}
