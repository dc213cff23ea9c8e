//! API設定の定数定義

/// デフォルトのバインドアドレス
///
/// 開発環境での利用を想定した localhost の標準ポート。
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5540";

/// デフォルトの辞書プリセット名
///
/// 読み列が安定している IPADIC をデフォルトとして使用。
pub const DEFAULT_PRESET_DICT: &str = "ipadic";

/// デフォルトのレコードストアファイル
pub const DEFAULT_STORE_PATH: &str = "./data/records.json";

/// 状態レスポンスに保持する通知の最大件数
///
/// 古いものから捨てる。
pub const MAX_STATUS_NOTICES: usize = 50;
