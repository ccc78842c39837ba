//! 播放器状态

use serde::Serialize;

/// 引擎 `ready` 之前使用的音量
pub const DEFAULT_VOLUME: f32 = 0.5;

/// 音量步进
pub const VOLUME_STEP: f32 = 0.1;

/// 播放器可观察状态
///
/// 只在操作方法和引擎事件处理中更新。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub playing: bool,
    pub volume: f32,
    pub muted: bool,
    /// 总时长（秒），`ready` 时设置
    pub duration: f64,
    /// 当前位置（秒），播放中持续更新
    pub current_time: f64,
    /// `ready` 时由音频源路径得出
    pub file_name: String,
    /// 最近一次引擎错误
    pub last_error: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playing: false,
            volume: DEFAULT_VOLUME,
            muted: false,
            duration: 0.0,
            current_time: 0.0,
            file_name: String::new(),
            last_error: None,
        }
    }
}

impl PlayerState {
    /// 实际作用于引擎的音量，静音时为 0
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// 播放进度 [0, 1]，时长未知时为 0
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_volume() {
        let mut state = PlayerState {
            volume: 0.7,
            ..Default::default()
        };
        assert_eq!(state.effective_volume(), 0.7);

        state.muted = true;
        assert_eq!(state.effective_volume(), 0.0);
        assert_eq!(state.volume, 0.7);
    }

    #[test]
    fn test_progress() {
        let mut state = PlayerState::default();
        assert_eq!(state.progress(), 0.0);

        state.duration = 200.0;
        state.current_time = 50.0;
        assert_eq!(state.progress(), 0.25);

        state.current_time = 250.0;
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(PlayerState::default()).unwrap();
        assert_eq!(json["playing"], false);
        assert_eq!(json["volume"], 0.5);
        assert_eq!(json["file_name"], "");
        assert!(json["last_error"].is_null());
    }
}
