//! 主题定义

use egui::{Color32, Rounding, Stroke, Style, Visuals};
use wavedeck_engine::Rgba;

/// 深色主题
pub struct DeckTheme;

impl DeckTheme {
    pub const BG_DEEP: Color32 = Color32::from_rgb(15, 23, 42);
    pub const BG_SURFACE: Color32 = Color32::from_rgb(30, 41, 59);
    pub const BG_BUTTON: Color32 = Color32::from_rgb(203, 213, 225);
    pub const BG_BUTTON_HOVER: Color32 = Color32::from_rgb(100, 116, 139);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_ERROR: Color32 = Color32::from_rgb(248, 113, 113);
    pub const BORDER: Color32 = Color32::from_rgb(71, 85, 105);

    /// 应用主题到 egui context
    pub fn apply(ctx: &egui::Context) {
        let mut style = Style::default();
        let mut visuals = Visuals::dark();

        visuals.panel_fill = Self::BG_DEEP;
        visuals.window_fill = Self::BG_SURFACE;
        visuals.extreme_bg_color = Self::BG_DEEP;

        // 按钮：浅底深色图标
        visuals.widgets.inactive.weak_bg_fill = Self::BG_BUTTON;
        visuals.widgets.inactive.bg_fill = Self::BG_BUTTON;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::BLACK);
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Self::BORDER);
        visuals.widgets.inactive.rounding = Rounding::same(6.0);

        visuals.widgets.hovered.weak_bg_fill = Self::BG_BUTTON_HOVER;
        visuals.widgets.hovered.bg_fill = Self::BG_BUTTON_HOVER;
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.hovered.rounding = Rounding::same(6.0);

        visuals.widgets.active.rounding = Rounding::same(6.0);

        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);

        ctx.set_style(style);
    }

    pub fn color(rgba: Rgba) -> Color32 {
        Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}
