//! 波形区域
//!
//! 按展示参数把引擎给出的峰值画成居中的柱状波形，已播放部分使用进度色。

use egui::{pos2, vec2, Rect, Sense, Stroke, Ui};
use wavedeck_engine::{bucket_peaks, AudioEngine, EngineFactory};
use wavedeck_player::Player;

use crate::ui::theme::DeckTheme;

/// 关闭自适应宽度时使用的固定宽度
const FIXED_WIDTH: f32 = 384.0;

pub struct WaveformView;

impl WaveformView {
    pub fn show<F: EngineFactory>(ui: &mut Ui, player: &Player<F>) {
        let options = player.options();
        let width = if options.responsive {
            ui.available_width()
        } else {
            FIXED_WIDTH
        };

        let (rect, _) = ui.allocate_exact_size(vec2(width, options.height), Sense::hover());
        let painter = ui.painter_at(rect);

        let peaks = player.engine().map(|e| e.peaks()).unwrap_or_default();
        let count = bar_count(rect.width(), options.bar_width, options.bar_gap);
        let heights = bar_heights(&peaks, count);
        let progress = player.state().progress();
        let step = options.bar_width + options.bar_gap;

        for (i, value) in heights.iter().enumerate() {
            let x = rect.left() + i as f32 * step + options.bar_width / 2.0;
            let height = (value * rect.height()).max(1.0);
            let played = (i as f32 + 0.5) / heights.len() as f32 <= progress;
            let color = if played {
                options.progress_color
            } else {
                options.wave_color
            };

            painter.rect_filled(
                Rect::from_center_size(pos2(x, rect.center().y), vec2(options.bar_width, height)),
                0.0,
                DeckTheme::color(color),
            );
        }

        if !options.cursor_color.is_transparent() {
            let x = rect.left() + progress * rect.width();
            painter.line_segment(
                [pos2(x, rect.top()), pos2(x, rect.bottom())],
                Stroke::new(1.0, DeckTheme::color(options.cursor_color)),
            );
        }
    }
}

/// 给定宽度能放下的柱子数
pub fn bar_count(width: f32, bar_width: f32, bar_gap: f32) -> usize {
    let step = (bar_width + bar_gap).max(1.0);
    ((width + bar_gap) / step).floor().max(0.0) as usize
}

/// 把峰值映射到 `count` 根柱子；峰值较多时合并取最大，较少时拉伸
pub fn bar_heights(peaks: &[f32], count: usize) -> Vec<f32> {
    if peaks.is_empty() || count == 0 {
        return Vec::new();
    }
    if peaks.len() >= count {
        return bucket_peaks(peaks, count);
    }
    (0..count).map(|i| peaks[i * peaks.len() / count]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_count() {
        // 2px 柱 + 3px 间隔，最后一根柱子后面不需要间隔
        assert_eq!(bar_count(384.0, 2.0, 3.0), 77);
        assert_eq!(bar_count(2.0, 2.0, 3.0), 1);
        assert_eq!(bar_count(0.0, 2.0, 3.0), 0);
    }

    #[test]
    fn test_bar_heights_merge() {
        let peaks = [0.1, 0.9, 0.2, 0.4];
        assert_eq!(bar_heights(&peaks, 2), vec![0.9, 0.4]);
    }

    #[test]
    fn test_bar_heights_stretch() {
        let peaks = [0.2, 0.8];
        assert_eq!(bar_heights(&peaks, 4), vec![0.2, 0.2, 0.8, 0.8]);
    }

    #[test]
    fn test_bar_heights_empty() {
        assert!(bar_heights(&[], 10).is_empty());
        assert!(bar_heights(&[0.5], 0).is_empty());
    }
}
