//! 血圧・心拍記録リーダー - メインエントリポイント

use anyhow::Result;
use bp_log_reader::config::AppConfig;
use std::path::PathBuf;

fn main() -> Result<()> {
    // ロギング初期化
    tracing_subscriber::fmt::init();

    // 環境変数の読み込み
    let config = AppConfig::from_env();

    // 引数の画像があれば最初に読み込む
    let initial_image = std::env::args_os().nth(1).map(PathBuf::from);

    // GUIアプリケーション起動
    bp_log_reader::gui::run(config, initial_image)
}
