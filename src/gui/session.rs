//! 画面に表示中の記録と、操作ごとの通知

use crate::export::write_csv;
use crate::parser::LogEntry;
use crate::pipeline::{OutcomeStatus, ProcessOutcome};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// モーダルで表示するメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn info(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: "Warning",
            message: message.into(),
        }
    }

    pub fn error(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title,
            message: message.into(),
        }
    }

    /// ダイアログを表示（閉じるまでブロック）
    pub fn show(&self) {
        let level = match self.level {
            NoticeLevel::Info => rfd::MessageLevel::Info,
            NoticeLevel::Warning => rfd::MessageLevel::Warning,
            NoticeLevel::Error => rfd::MessageLevel::Error,
        };

        let _ = rfd::MessageDialog::new()
            .set_level(level)
            .set_title(self.title)
            .set_description(&self.message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// フォルダを開いた結果（失敗時のみ通知）
pub fn open_folder_notice(folder: &Path, result: std::io::Result<()>) -> Option<Notice> {
    result.err().map(|e| {
        Notice::error(
            "Error",
            format!("Failed to open folder {}: {}", folder.display(), e),
        )
    })
}

/// 1回の処理で得られた記録（次の処理かクリアで置き換わる）
#[derive(Debug, Default)]
pub struct LogSession {
    /// 選択中の画像
    pub image_path: Option<PathBuf>,
    /// 抽出された記録
    pub entries: Vec<LogEntry>,
    /// 直近のOCRテキスト
    pub raw_text: String,
}

impl LogSession {
    /// 画像を選択
    pub fn select_image(&mut self, path: PathBuf) {
        self.image_path = Some(path);
    }

    /// 選択中の画像のファイル名
    pub fn file_label(&self) -> Option<String> {
        let path = self.image_path.as_ref()?;
        Some(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        )
    }

    /// 処理結果を反映して、表示する通知を返す
    pub fn apply_outcome(&mut self, outcome: ProcessOutcome) -> Notice {
        let status = outcome.status();
        self.raw_text = outcome.raw_text;

        match status {
            // 前回の結果はそのまま残す
            OutcomeStatus::NoText => {
                Notice::warning("No text could be extracted from the image.")
            }
            OutcomeStatus::NoEntries => {
                self.entries.clear();
                Notice::info("Info", "No medical data patterns found in the extracted text.")
            }
            OutcomeStatus::Extracted(count) => {
                self.entries = outcome.entries;
                Notice::info(
                    "Success",
                    format!("Successfully extracted {} entries.", count),
                )
            }
        }
    }

    /// 記録をCSVに書き出す
    pub fn export(&self, path: &Path) -> Result<()> {
        write_csv(path, &self.entries)
    }

    /// 結果をクリア（選択中の画像は残す）
    pub fn clear(&mut self) {
        self.entries.clear();
        self.raw_text.clear();
    }
}
