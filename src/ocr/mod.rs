//! OCRモジュール - 前処理とテキスト認識

mod preprocess;
mod tesseract;

pub use preprocess::{preprocess, PreprocessConfig};
pub use tesseract::{OcrError, TesseractEngine, CHAR_WHITELIST, INSTALL_HINTS};

use anyhow::Result;
use image::GrayImage;

/// 画像からテキストを取り出すエンジン
pub trait TextRecognizer: Send + Sync {
    /// 前処理済みの画像からテキストを抽出
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}
