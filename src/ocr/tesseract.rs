//! Tesseract OCR - rusty-tesseract によるテキスト抽出

use super::TextRecognizer;
use crate::config::OcrConfig;
use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage};
use rusty_tesseract::{Args, Image, TessError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// 認識を許可する文字
pub const CHAR_WHITELIST: &str =
    "0123456789/:-. ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Tesseractが見つからない場合の案内
pub const INSTALL_HINTS: &str = "Tesseract OCR is not installed or not found in PATH.\n\
Please install Tesseract OCR to use this application.\n\n\
On macOS: brew install tesseract\n\
On Ubuntu: sudo apt install tesseract-ocr\n\
On Windows: Download from https://github.com/UB-Mannheim/tesseract/wiki";

/// OCRエラー
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Tesseract OCR was not found on PATH")]
    NotInstalled,
    #[error("Tesseract failed: {0}")]
    Failed(String),
}

impl From<TessError> for OcrError {
    fn from(err: TessError) -> Self {
        match err {
            TessError::TesseractNotFoundError => OcrError::NotInstalled,
            other => OcrError::Failed(other.to_string()),
        }
    }
}

/// システムの `tesseract` を使う認識エンジン
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    lang: String,
    psm: u8,
    oem: u8,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            lang: config.lang.clone(),
            psm: config.psm,
            oem: config.oem,
        }
    }

    /// インストール確認（バージョン文字列を返す）
    pub fn version(&self) -> Result<String, OcrError> {
        let version = rusty_tesseract::get_tesseract_version()?;
        Ok(version.trim().to_string())
    }

    /// 認識パラメータ（文字種を制限）
    pub fn args(&self) -> Args {
        Args {
            lang: self.lang.clone(),
            config_variables: HashMap::from([(
                "tessedit_char_whitelist".to_string(),
                CHAR_WHITELIST.to_string(),
            )]),
            dpi: None,
            psm: Some(i32::from(self.psm)),
            oem: Some(i32::from(self.oem)),
        }
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        let dynamic_img = DynamicImage::ImageLuma8(image.clone());
        let tess_img = Image::from_dynamic_image(&dynamic_img)
            .map_err(OcrError::from)
            .context("Tesseract用の画像作成に失敗")?;

        let text = rusty_tesseract::image_to_string(&tess_img, &self.args())
            .map_err(OcrError::from)
            .context("Tesseractによるテキスト抽出に失敗")?;

        debug!("tesseract returned {} bytes", text.len());
        info!(
            "OCR finished for {}x{} image ({} chars)",
            image.width(),
            image.height(),
            text.len()
        );
        Ok(text)
    }
}
