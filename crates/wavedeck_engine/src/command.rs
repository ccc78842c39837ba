//! 引擎命令和事件定义

use std::fmt;

/// 工作线程命令（引擎句柄 -> 工作线程）
#[derive(Debug, Clone)]
pub(crate) enum EngineCommand {
    /// 加载音频源（路径或 `file://` URL），`generation` 落后时放弃加载
    Load { source: String, generation: u64 },
    /// 切换播放/暂停
    PlayPause,
    /// 设置音量 (0.0 - 1.0)
    SetVolume(f32),
    /// 关闭工作线程
    Shutdown,
}

/// 引擎事件（引擎 -> 监听者）
///
/// 除错误外不携带数据，监听者收到后通过引擎的 getter 读取最新值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// 音频已加载，时长和波形可用
    Ready,
    /// 播放进度更新（播放中周期性触发）
    TimeUpdate,
    /// 播放到结尾
    Finished,
    /// 加载、解码或输出失败
    Error(String),
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::Ready => EventKind::Ready,
            EngineEvent::TimeUpdate => EventKind::TimeUpdate,
            EngineEvent::Finished => EventKind::Finished,
            EngineEvent::Error(_) => EventKind::Error,
        }
    }
}

/// 可订阅的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    TimeUpdate,
    Finished,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Ready,
        EventKind::TimeUpdate,
        EventKind::Finished,
        EventKind::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::TimeUpdate => "time-update",
            EventKind::Finished => "finished",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 监听者标识，由 `AudioEngine::on` 返回，`un` 凭此移除同一个监听者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);
