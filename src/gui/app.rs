//! メインアプリケーションウィンドウ

use super::session::{open_folder_notice, LogSession, Notice};
use super::theme::{light_theme, Colors};
use crate::config::AppConfig;
use crate::export::{ensure_csv_extension, is_supported_image, IMAGE_EXTENSIONS};
use crate::ocr::{OcrError, PreprocessConfig, TesseractEngine, TextRecognizer, INSTALL_HINTS};
use crate::pipeline::{process_image, ProcessOutcome};
use anyhow::{Context, Result};
use chrono::Local;
use eframe::egui;
use egui::load::SizedTexture;
use egui::{CentralPanel, RichText, TextureHandle, Vec2};
use egui_extras::{Column, TableBuilder};
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

const TITLE: &str = "Blood Pressure & Heart Rate Log Reader";

/// プレビューの最大辺
pub const PREVIEW_MAX: u32 = 300;

/// バックグラウンド処理の結果
type JobResult = Result<ProcessOutcome, String>;

/// 画面操作
enum Action {
    Browse,
    Process,
    Export,
    Clear,
    OpenFolder,
}

/// アプリケーション状態
pub struct LogReaderApp {
    /// 表示中の記録
    session: LogSession,
    /// OCRエンジン
    recognizer: Arc<dyn TextRecognizer>,
    /// 前処理パラメータ
    preprocess: PreprocessConfig,
    /// Tokioランタイム
    runtime: Runtime,
    /// 画像プレビュー
    preview: Option<TextureHandle>,
    /// 起動時に指定された画像（最初のフレームで読み込む）
    pending_image: Option<PathBuf>,
    /// 処理中かどうか
    is_processing: bool,
    /// ステータスメッセージ
    status: String,
    /// 最後にエクスポートしたフォルダ
    last_export_dir: Option<PathBuf>,
    /// 結果受信チャンネル
    result_rx: Receiver<JobResult>,
    /// 結果送信チャンネル
    result_tx: Sender<JobResult>,
}

impl LogReaderApp {
    pub fn new(
        config: &AppConfig,
        recognizer: Arc<dyn TextRecognizer>,
        initial_image: Option<PathBuf>,
    ) -> Result<Self> {
        let (result_tx, result_rx) = channel();

        Ok(Self {
            session: LogSession::default(),
            recognizer,
            preprocess: config.preprocess,
            runtime: Runtime::new().context("Tokioランタイムの作成に失敗")?,
            preview: None,
            pending_image: initial_image,
            is_processing: false,
            status: "Select an image of a handwritten log to begin".to_string(),
            last_export_dir: None,
            result_rx,
            result_tx,
        })
    }

    /// ファイル選択ダイアログ
    fn browse_file(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select an image file")
            .add_filter("Image files", IMAGE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.select_image(ctx, path);
        }
    }

    /// 画像を選択してプレビューを読み込む
    fn select_image(&mut self, ctx: &egui::Context, path: PathBuf) {
        info!("selected image {:?}", path);
        self.session.select_image(path.clone());
        self.preview = None;

        match load_preview(ctx, &path) {
            Ok(texture) => {
                self.preview = Some(texture);
                self.status = "Image loaded. Click \"Process Image\" to extract readings".to_string();
            }
            Err(e) => {
                warn!("preview failed: {:#}", e);
                Notice::error("Error", format!("Failed to load image: {:#}", e)).show();
            }
        }
    }

    /// 画像を処理（バックグラウンド）
    fn start_processing(&mut self, ctx: &egui::Context) {
        if self.is_processing {
            return;
        }
        let Some(path) = self.session.image_path.clone() else {
            Notice::warning("Please select an image file first.").show();
            return;
        };

        self.is_processing = true;
        self.status = format!(
            "Processing {}...",
            self.session.file_label().unwrap_or_default()
        );

        let recognizer = Arc::clone(&self.recognizer);
        let preprocess = self.preprocess;
        let result_tx = self.result_tx.clone();
        let ctx = ctx.clone();
        let today = Local::now().date_naive();

        self.runtime.spawn_blocking(move || {
            let result = process_image(&path, recognizer.as_ref(), &preprocess, today)
                .map_err(|e| format!("{:#}", e));
            let _ = result_tx.send(result);
            ctx.request_repaint();
        });
    }

    /// 結果を受信
    fn receive_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.is_processing = false;

            let notice = match result {
                Ok(outcome) => {
                    let notice = self.session.apply_outcome(outcome);
                    self.status = notice.message.clone();
                    notice
                }
                Err(e) => {
                    error!("processing failed: {}", e);
                    self.status = "Processing failed".to_string();
                    Notice::error("Error", format!("Processing failed: {}", e))
                }
            };
            notice.show();
        }
    }

    /// CSVに書き出す
    fn export_csv(&mut self) {
        if self.session.entries.is_empty() {
            Notice::warning("No data to export. Please process an image first.").show();
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .set_title("Save CSV file")
            .add_filter("CSV files", &["csv"])
            .set_file_name("blood_pressure_log.csv")
            .save_file()
        else {
            return;
        };
        let path = ensure_csv_extension(path);

        let notice = match self.session.export(&path) {
            Ok(()) => {
                self.last_export_dir = path.parent().map(Path::to_path_buf);
                self.status = format!("Exported {} entries", self.session.entries.len());
                Notice::info(
                    "Success",
                    format!("Data exported successfully to {}", path.display()),
                )
            }
            Err(e) => {
                error!("export failed: {:#}", e);
                Notice::error("Error", format!("Export failed: {:#}", e))
            }
        };
        notice.show();
    }

    fn clear_results(&mut self) {
        self.session.clear();
        self.status = "Results cleared".to_string();
    }

    fn results_table(&self, ui: &mut egui::Ui) {
        let entries = &self.session.entries;
        let cell = |value: &Option<String>| value.as_deref().unwrap_or("").to_string();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::initial(100.0).at_least(80.0))
            .columns(Column::remainder().at_least(60.0), 3)
            .header(22.0, |mut header| {
                for title in ["Date", "Systolic", "Diastolic", "Heart Rate"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, entries.len(), |mut row| {
                    let entry = &entries[row.index()];
                    for value in [
                        &entry.date,
                        &entry.systolic,
                        &entry.diastolic,
                        &entry.heart_rate,
                    ] {
                        row.col(|ui| {
                            ui.label(cell(value));
                        });
                    }
                });
            });
    }
}

impl eframe::App for LogReaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 結果を受信
        self.receive_results();

        if let Some(path) = self.pending_image.take() {
            self.select_image(ctx, path);
        }

        // ドロップされた画像を選択
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| is_supported_image(p))
        });
        if let Some(path) = dropped {
            if !self.is_processing {
                self.select_image(ctx, path);
            }
        }

        // 処理中は待機カーソル
        if self.is_processing {
            ctx.set_cursor_icon(egui::CursorIcon::Wait);
            ctx.request_repaint();
        }

        let mut action = None;

        // ステータスバー
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.is_processing {
                    ui.spinner();
                }
                ui.label(RichText::new(&self.status).size(13.0).color(Colors::TEXT_MUTED));
            });
        });

        CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = Vec2::new(8.0, 10.0);

            ui.vertical_centered(|ui| {
                ui.heading(
                    RichText::new("Handwritten Medical Log Reader")
                        .size(22.0)
                        .strong()
                        .color(Colors::TEXT_PRIMARY),
                );
            });

            // ファイル選択
            ui.horizontal(|ui| {
                ui.label("Select Image:");
                match self.session.file_label() {
                    Some(name) => ui.label(RichText::new(name).color(Colors::TEXT_PRIMARY)),
                    None => ui.label(RichText::new("No file selected").color(Colors::TEXT_MUTED)),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!self.is_processing, egui::Button::new("Browse"))
                        .clicked()
                    {
                        action = Some(Action::Browse);
                    }
                });
            });

            // ボタン
            ui.horizontal(|ui| {
                let idle = !self.is_processing;
                if ui.add_enabled(idle, egui::Button::new("Process Image")).clicked() {
                    action = Some(Action::Process);
                }
                if ui.add_enabled(idle, egui::Button::new("Export to CSV")).clicked() {
                    action = Some(Action::Export);
                }
                if ui.add_enabled(idle, egui::Button::new("Clear Results")).clicked() {
                    action = Some(Action::Clear);
                }
                if ui
                    .add_enabled(
                        self.last_export_dir.is_some(),
                        egui::Button::new("Open folder"),
                    )
                    .clicked()
                {
                    action = Some(Action::OpenFolder);
                }
            });

            // 生テキスト
            if !self.session.raw_text.is_empty() {
                egui::CollapsingHeader::new("Raw OCR text").show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("raw_text")
                        .max_height(120.0)
                        .show(ui, |ui| {
                            let mut text = self.session.raw_text.as_str();
                            ui.add(
                                egui::TextEdit::multiline(&mut text)
                                    .font(egui::TextStyle::Monospace)
                                    .desired_width(f32::INFINITY),
                            );
                        });
                });
            }

            // プレビューと結果
            ui.columns(2, |columns| {
                columns[0].group(|ui| {
                    ui.label(RichText::new("Image Preview").strong());
                    ui.set_min_size(Vec2::new(ui.available_width(), PREVIEW_MAX as f32));
                    ui.vertical_centered(|ui| match &self.preview {
                        Some(texture) => {
                            ui.add(egui::Image::new(SizedTexture::from_handle(texture)));
                        }
                        None => {
                            ui.label(RichText::new("No image loaded").color(Colors::TEXT_MUTED));
                        }
                    });
                });

                columns[1].group(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Extracted Data").strong());
                        if !self.session.entries.is_empty() {
                            ui.label(
                                RichText::new(format!("({} entries)", self.session.entries.len()))
                                    .color(Colors::TEXT_MUTED),
                            );
                        }
                    });
                    self.results_table(ui);
                });
            });
        });

        match action {
            Some(Action::Browse) => self.browse_file(ctx),
            Some(Action::Process) => self.start_processing(ctx),
            Some(Action::Export) => self.export_csv(),
            Some(Action::Clear) => self.clear_results(),
            Some(Action::OpenFolder) => {
                if let Some(ref folder) = self.last_export_dir {
                    if let Some(notice) = open_folder_notice(folder, open::that(folder)) {
                        error!("{}", notice.message);
                        notice.show();
                    }
                }
            }
            None => {}
        }
    }
}

/// プレビュー用の縮小画像（300x300 に収まるように、拡大はしない）
pub fn preview_thumbnail(image: &DynamicImage) -> DynamicImage {
    if image.width() <= PREVIEW_MAX && image.height() <= PREVIEW_MAX {
        image.clone()
    } else {
        image.resize(PREVIEW_MAX, PREVIEW_MAX, FilterType::Lanczos3)
    }
}

fn load_preview(ctx: &egui::Context, path: &Path) -> Result<TextureHandle> {
    let image = image::open(path)
        .with_context(|| format!("画像ファイルの読み込みに失敗: {:?}", path))?;
    let rgba = preview_thumbnail(&image).to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

    Ok(ctx.load_texture("preview", color, egui::TextureOptions::LINEAR))
}

/// OCRエンジンの確認（見つからなければ案内を表示）
fn check_ocr_engine(engine: &TesseractEngine) -> bool {
    match engine.version() {
        Ok(version) => {
            info!("using {}", version);
            true
        }
        Err(e) => {
            error!("OCR engine unavailable: {}", e);
            let message = match e {
                OcrError::NotInstalled => INSTALL_HINTS.to_string(),
                other => format!("{}\n\n{}", INSTALL_HINTS, other),
            };
            Notice::error("Tesseract Not Found", message).show();
            false
        }
    }
}

/// アプリケーションを起動
pub fn run(config: AppConfig, initial_image: Option<PathBuf>) -> Result<()> {
    let engine = TesseractEngine::new(&config.ocr);
    if !check_ocr_engine(&engine) {
        return Ok(());
    }

    let app = LogReaderApp::new(&config, Arc::new(engine), initial_image)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title(TITLE)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_style(light_theme());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("アプリケーションエラー: {}", e))
}
