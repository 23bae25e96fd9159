//! 血圧・心拍記録リーダー - 手書きの記録用紙をOCRで読み取りCSVに書き出すツール
//!
//! # 機能
//! - 画像の前処理（グレースケール、ぼかし、適応的二値化、クロージング）
//! - Tesseract によるテキスト抽出
//! - 日付・血圧・心拍数の抽出（1行 = 1件）
//! - 表形式の表示とCSVエクスポート

pub mod config;
pub mod export;
pub mod gui;
pub mod ocr;
pub mod parser;
pub mod pipeline;

pub use parser::LogEntry;
