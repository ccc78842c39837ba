//! 播放器
//!
//! 把界面操作转成引擎调用，把引擎事件写回 `PlayerState`。

use wavedeck_engine::{
    AudioEngine, EngineError, EngineEvent, EngineFactory, EventKind, WaveformOptions,
};

use crate::{AudioSource, EngineBinding, PlayerState, PlayerView, VOLUME_STEP};

/// 播放器错误
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// 播放器
///
/// 任意时刻最多持有一个引擎实例。
pub struct Player<F: EngineFactory> {
    factory: F,
    options: WaveformOptions,
    state: PlayerState,
    binding: Option<EngineBinding<F::Engine>>,
}

impl<F: EngineFactory> Player<F> {
    pub fn new(factory: F, options: WaveformOptions) -> Self {
        Self {
            factory,
            options,
            state: PlayerState::default(),
            binding: None,
        }
    }

    /// 挂载音频源
    ///
    /// 与当前音频源相同时不做任何事；否则先释放旧引擎，再创建新引擎并加载。
    pub fn mount(&mut self, source: impl Into<AudioSource>) -> Result<(), PlayerError> {
        let source = source.into();
        if self.source() == Some(&source) {
            return Ok(());
        }

        self.unmount();

        let engine = self.factory.create(&self.options)?;
        self.binding = Some(EngineBinding::bind(engine, source, &EventKind::ALL));
        Ok(())
    }

    /// 释放引擎并清空状态
    pub fn unmount(&mut self) {
        if let Some(binding) = self.binding.take() {
            tracing::debug!(source = %binding.source(), "unmounting");
        }
        self.state = PlayerState::default();
    }

    pub fn is_mounted(&self) -> bool {
        self.binding.is_some()
    }

    pub fn source(&self) -> Option<&AudioSource> {
        self.binding.as_ref().map(|b| b.source())
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.binding.as_ref().map(|b| b.engine())
    }

    pub fn options(&self) -> &WaveformOptions {
        &self.options
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn view(&self) -> PlayerView {
        PlayerView::from(&self.state)
    }

    /// 按顺序处理所有待处理的引擎事件，返回处理的数量
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.binding.as_ref().and_then(|b| b.try_next_event()) {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    fn handle_event(&mut self, event: EngineEvent) {
        let Some(binding) = &self.binding else {
            return;
        };
        let engine = binding.engine();

        match event {
            EngineEvent::Ready => {
                self.state.volume = engine.volume();
                self.state.duration = engine.duration();
                self.state.file_name = binding.source().display_name().to_string();
                self.state.last_error = None;
            }
            EngineEvent::TimeUpdate => {
                self.state.current_time = engine.current_time();
            }
            EngineEvent::Finished => {
                self.state.playing = false;
                self.state.current_time = 0.0;
            }
            EngineEvent::Error(message) => {
                tracing::warn!(source = %binding.source(), "engine error: {}", message);
                self.state.playing = false;
                self.state.last_error = Some(message);
            }
        }
    }

    pub fn toggle_play_pause(&mut self) {
        let Some(binding) = &mut self.binding else {
            return;
        };
        self.state.playing = !self.state.playing;
        binding.engine_mut().play_pause();
    }

    pub fn toggle_mute(&mut self) {
        let Some(binding) = &mut self.binding else {
            return;
        };
        self.state.muted = !self.state.muted;
        binding.engine_mut().set_volume(self.state.effective_volume());
    }

    /// 设置音量，调用方保证 `volume` 在 [0, 1] 内；设为 0 即静音
    pub fn set_volume(&mut self, volume: f32) {
        let Some(binding) = &mut self.binding else {
            return;
        };
        self.state.volume = volume;
        binding.engine_mut().set_volume(volume);
        self.state.muted = volume == 0.0;
    }

    pub fn volume_down(&mut self) {
        self.set_volume((self.state.volume - VOLUME_STEP).clamp(0.0, 1.0));
    }

    pub fn volume_up(&mut self) {
        self.set_volume((self.state.volume + VOLUME_STEP).clamp(0.0, 1.0));
    }
}
