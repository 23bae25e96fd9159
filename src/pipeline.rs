//! 画像 → 前処理 → OCR → 解析

use crate::ocr::{preprocess, PreprocessConfig, TextRecognizer};
use crate::parser::{parse_log_text, LogEntry};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

/// 1枚の画像の処理結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutcome {
    /// OCRの生テキスト
    pub raw_text: String,
    /// 抽出された記録
    pub entries: Vec<LogEntry>,
}

/// 処理結果の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// テキストを抽出できなかった（警告）
    NoText,
    /// テキストはあるが記録が見つからなかった（情報）
    NoEntries,
    /// n 件抽出
    Extracted(usize),
}

impl ProcessOutcome {
    pub fn status(&self) -> OutcomeStatus {
        if self.raw_text.trim().is_empty() {
            OutcomeStatus::NoText
        } else if self.entries.is_empty() {
            OutcomeStatus::NoEntries
        } else {
            OutcomeStatus::Extracted(self.entries.len())
        }
    }
}

/// 画像ファイルを処理
pub fn process_image(
    path: impl AsRef<Path>,
    recognizer: &dyn TextRecognizer,
    config: &PreprocessConfig,
    today: NaiveDate,
) -> Result<ProcessOutcome> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("画像ファイルの読み込みに失敗: {:?}", path))?;
    info!("processing {:?} ({}x{})", path, image.width(), image.height());

    let prepared = preprocess(&image, config);
    let raw_text = recognizer.recognize(&prepared)?;

    let entries = if raw_text.trim().is_empty() {
        Vec::new()
    } else {
        parse_log_text(&raw_text, today)
    };
    info!("parsed {} entries from {:?}", entries.len(), path);

    Ok(ProcessOutcome { raw_text, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::sync::Mutex;

    /// 固定テキストを返す認識エンジン
    struct FixedText {
        text: String,
        seen: Mutex<Option<(u32, u32)>>,
    }

    impl FixedText {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                seen: Mutex::new(None),
            }
        }
    }

    impl TextRecognizer for FixedText {
        fn recognize(&self, image: &GrayImage) -> Result<String> {
            assert!(image.pixels().all(|p| p[0] == 0 || p[0] == 255));
            *self.seen.lock().unwrap() = Some(image.dimensions());
            Ok(self.text.clone())
        }
    }

    struct Failing;

    impl TextRecognizer for Failing {
        fn recognize(&self, _image: &GrayImage) -> Result<String> {
            anyhow::bail!("engine crashed")
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn sample_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("page.png");
        GrayImage::from_pixel(40, 30, Luma([230])).save(&path).unwrap();
        path
    }

    #[test]
    fn recognized_text_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let recognizer = FixedText::new("04/12/2024 120/80 72\nnotes\n");

        let outcome =
            process_image(&path, &recognizer, &PreprocessConfig::default(), today()).unwrap();

        assert_eq!(*recognizer.seen.lock().unwrap(), Some((40, 30)));
        assert_eq!(outcome.status(), OutcomeStatus::Extracted(1));
        assert_eq!(outcome.entries[0].systolic.as_deref(), Some("120"));
        assert_eq!(outcome.raw_text, "04/12/2024 120/80 72\nnotes\n");
    }

    #[test]
    fn blank_text_and_no_entries_are_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let cfg = PreprocessConfig::default();

        let blank = process_image(&path, &FixedText::new(" \n\n"), &cfg, today()).unwrap();
        assert_eq!(blank.status(), OutcomeStatus::NoText);

        let words = process_image(&path, &FixedText::new("Blood pressure log"), &cfg, today())
            .unwrap();
        assert_eq!(words.status(), OutcomeStatus::NoEntries);
    }

    #[test]
    fn unreadable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = process_image(&path, &FixedText::new("75"), &PreprocessConfig::default(), today())
            .unwrap_err();
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn recognizer_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let err = process_image(&path, &Failing, &PreprocessConfig::default(), today())
            .unwrap_err();
        assert_eq!(err.to_string(), "engine crashed");
    }
}
