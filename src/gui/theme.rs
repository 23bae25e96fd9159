//! テーマ設定 - 記録用紙に近い明るいテーマ

use egui::{Color32, CornerRadius, Stroke, Style, Visuals};

/// カラーパレット
pub struct Colors;

impl Colors {
    pub const BG_PAPER: Color32 = Color32::from_rgb(248, 248, 244);
    pub const BG_PANEL: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BG_STRIPE: Color32 = Color32::from_rgb(238, 242, 246);
    pub const ACCENT: Color32 = Color32::from_rgb(29, 112, 160);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(28, 32, 38);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(128, 128, 128);
    pub const BORDER: Color32 = Color32::from_rgb(206, 212, 220);
}

/// 明るいテーマのスタイルを作成
pub fn light_theme() -> Style {
    let mut style = Style::default();
    let mut visuals = Visuals::light();

    visuals.panel_fill = Colors::BG_PAPER;
    visuals.window_fill = Colors::BG_PANEL;
    visuals.extreme_bg_color = Colors::BG_PANEL;
    // 表の縞模様
    visuals.faint_bg_color = Colors::BG_STRIPE;

    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Colors::BORDER);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Colors::TEXT_PRIMARY);
    visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);

    for widget in [
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.corner_radius = CornerRadius::same(4);
    }
    visuals.widgets.active.bg_fill = Colors::ACCENT;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Colors::ACCENT);

    visuals.selection.bg_fill = Colors::ACCENT.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, Colors::ACCENT);

    style.visuals = visuals;
    style
}
