//! 引擎接口
//!
//! 播放器只通过这组接口驱动引擎，任何满足接口的实现都可以替换本地引擎。

use crossbeam_channel::Sender;

use crate::{DecoderError, EngineEvent, EventKind, ListenerId, OutputError, WaveformOptions};

/// 引擎错误
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
    #[error("Failed to spawn engine worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 波形音频引擎实例
pub trait AudioEngine {
    /// 异步加载音频源，完成后触发 `ready` 或 `error`
    fn load(&mut self, source: &str);

    /// 切换播放/暂停
    fn play_pause(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// 总时长（秒），`ready` 之前为 0
    fn duration(&self) -> f64;

    /// 当前播放位置（秒）
    fn current_time(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// 归一化后的波形峰值，`ready` 之前为空
    fn peaks(&self) -> Vec<f32> {
        Vec::new()
    }

    /// 订阅事件，事件按触发顺序发送到 `handler`
    fn on(&mut self, kind: EventKind, handler: Sender<EngineEvent>) -> ListenerId;

    /// 移除 `on` 注册的监听者，返回是否确实移除
    fn un(&mut self, kind: EventKind, id: ListenerId) -> bool;

    /// 销毁实例，之后不再触发任何事件
    fn destroy(&mut self);
}

/// 引擎工厂
pub trait EngineFactory {
    type Engine: AudioEngine;

    fn create(&mut self, options: &WaveformOptions) -> Result<Self::Engine, EngineError>;
}
