//! 界面显示模型

use crate::{format_time, volume_percent, PlayerState};

/// 播放/暂停按钮图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIcon {
    Play,
    Pause,
}

impl TransportIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            TransportIcon::Play => "▶",
            TransportIcon::Pause => "⏸",
        }
    }
}

/// 静音按钮图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteIcon {
    Muted,
    Unmuted,
}

impl MuteIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            MuteIcon::Muted => "🔇",
            MuteIcon::Unmuted => "🔈",
        }
    }
}

/// 界面需要展示的全部内容
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub file_name: String,
    pub duration_text: String,
    pub current_time_text: String,
    pub volume_text: String,
    pub transport_icon: TransportIcon,
    pub mute_icon: MuteIcon,
    /// 音量滑条位置，静音时为 0
    pub slider_value: f32,
    pub progress: f32,
    pub error: Option<String>,
}

impl From<&PlayerState> for PlayerView {
    fn from(state: &PlayerState) -> Self {
        Self {
            file_name: state.file_name.clone(),
            duration_text: format_time(state.duration),
            current_time_text: format_time(state.current_time),
            volume_text: format!("{}%", volume_percent(state.volume)),
            transport_icon: if state.playing {
                TransportIcon::Pause
            } else {
                TransportIcon::Play
            },
            mute_icon: if state.muted {
                MuteIcon::Muted
            } else {
                MuteIcon::Unmuted
            },
            slider_value: state.effective_volume(),
            progress: state.progress(),
            error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_state() {
        let state = PlayerState {
            playing: true,
            volume: 0.8,
            muted: true,
            duration: 125.0,
            current_time: 30.0,
            file_name: "chapter-1.mp3".to_string(),
            last_error: None,
        };

        let view = PlayerView::from(&state);
        assert_eq!(view.file_name, "chapter-1.mp3");
        assert_eq!(view.duration_text, "00:02:05");
        assert_eq!(view.current_time_text, "00:00:30");
        // 百分比显示的是保存的音量，不受静音影响
        assert_eq!(view.volume_text, "80%");
        assert_eq!(view.slider_value, 0.0);
        assert_eq!(view.transport_icon, TransportIcon::Pause);
        assert_eq!(view.mute_icon, MuteIcon::Muted);
        assert!((view.progress - 0.24).abs() < 1e-6);
    }
}
