//! 設定 - 環境変数 (.env) から読み込む

use crate::ocr::PreprocessConfig;
use std::str::FromStr;
use tracing::warn;

/// 認識言語
pub const ENV_OCR_LANG: &str = "BP_LOG_OCR_LANG";
/// ページ分割モード
pub const ENV_PSM: &str = "BP_LOG_PSM";
/// OCRエンジンモード
pub const ENV_OEM: &str = "BP_LOG_OEM";

/// OCR設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub lang: String,
    /// 6 = 均一なテキストブロック
    pub psm: u8,
    /// 3 = デフォルトエンジン
    pub oem: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            psm: 6,
            oem: 3,
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
}

impl AppConfig {
    /// 環境変数から読み込む（.env があればそれも）
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = OcrConfig::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ocr = OcrConfig {
            lang: non_empty(ENV_OCR_LANG).unwrap_or(defaults.lang),
            psm: parse_or(ENV_PSM, non_empty(ENV_PSM), defaults.psm),
            oem: parse_or(ENV_OEM, non_empty(ENV_OEM), defaults.oem),
        };

        Self {
            ocr,
            preprocess: PreprocessConfig::default(),
        }
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} の値が不正です ({:?})、既定値を使用します", key, raw);
            default
        }),
        None => default,
    }
}
