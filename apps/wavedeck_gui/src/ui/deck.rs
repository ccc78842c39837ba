//! 播放控制栏和信息面板

use std::path::PathBuf;

use egui::{RichText, Ui};
use wavedeck_engine::EngineFactory;
use wavedeck_player::Player;

use crate::ui::theme::DeckTheme;

/// 滑条步进
const SLIDER_STEP: f64 = 0.05;

/// 需要由宿主处理的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckAction {
    /// 打开另一个音频文件
    Open(PathBuf),
}

pub struct PlayerDeck;

impl PlayerDeck {
    pub fn show<F: EngineFactory>(ui: &mut Ui, player: &mut Player<F>) -> Option<DeckAction> {
        let mut action = None;
        let view = player.view();

        ui.horizontal(|ui| {
            // 播放/暂停
            if ui
                .add(egui::Button::new(view.transport_icon.glyph()).min_size(egui::vec2(36.0, 0.0)))
                .clicked()
            {
                player.toggle_play_pause();
            }

            // 静音/取消静音
            if ui
                .add(egui::Button::new(view.mute_icon.glyph()).min_size(egui::vec2(36.0, 0.0)))
                .clicked()
            {
                player.toggle_mute();
            }

            // 音量滑条，静音时显示 0
            let mut value = view.slider_value;
            let slider = egui::Slider::new(&mut value, 0.0..=1.0)
                .step_by(SLIDER_STEP)
                .show_value(false);
            if ui.add(slider).changed() {
                player.set_volume(value);
            }

            if ui.button("🔉").on_hover_text("Volume down").clicked() {
                player.volume_down();
            }
            if ui.button("🔊").on_hover_text("Volume up").clicked() {
                player.volume_up();
            }

            ui.add_space(8.0);

            if ui.button("📂").on_hover_text("Open file").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Audio", &["mp3", "wav", "ogg", "flac"])
                    .add_filter("All Files", &["*"])
                    .pick_file()
                {
                    action = Some(DeckAction::Open(path));
                }
            }
        });

        action
    }

    /// 文件名、时长、当前时间和音量
    pub fn info<F: EngineFactory>(ui: &mut Ui, player: &Player<F>, mount_error: Option<&str>) {
        let view = player.view();

        egui::Frame::none()
            .fill(DeckTheme::BG_SURFACE)
            .rounding(egui::Rounding::same(4.0))
            .inner_margin(egui::Margin::symmetric(15.0, 8.0))
            .show(ui, |ui| {
                let text = |s: String| RichText::new(s).size(12.0).color(DeckTheme::TEXT_PRIMARY);

                ui.label(text(format!("Playing: {}", view.file_name)));
                ui.label(text(format!(
                    "Duration: {} | Current Time: {}",
                    view.duration_text, view.current_time_text
                )));
                ui.label(text(format!("Volume: {}", view.volume_text)));

                if let Some(error) = mount_error.or(view.error.as_deref()) {
                    ui.label(RichText::new(error).size(12.0).color(DeckTheme::TEXT_ERROR));
                }
            });
    }
}
