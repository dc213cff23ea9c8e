//! yomigana-api サーバーエントリーポイント

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use yomigana_api::ApiError;
use yomigana_api::api::AppState;
use yomigana_api::api::run_server;
use yomigana_api::config::Config;
use yomigana_api::service::YomiganaApiServiceFull;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
  // 設定の読み込み（ログレベルを決めるため最初に行う）
  let config = Config::from_env()?;

  // ロギングの初期化（RUST_LOG があればそちらを優先）
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
  tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

  tracing::info!(
    preset = ?config.preset,
    store = %config.store_path.display(),
    default_query = %config.default_query,
    "設定を読み込みました"
  );

  // サービスの初期化（辞書のロード・レコードストアのオープン）
  let service = Arc::new(YomiganaApiServiceFull::new(&config)?);
  tracing::info!("ふりがなサービスを初期化しました");

  // アプリケーション状態の作成
  let state = AppState::new(config, service);

  // サーバー起動
  run_server(state).await
}
