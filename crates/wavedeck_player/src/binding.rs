//! 引擎绑定
//!
//! 持有一个引擎实例、它的监听者和事件接收端。绑定被丢弃时移除注册过的
//! 每一个监听者并销毁引擎，卸载和切换音频源都经过这里。

use crossbeam_channel::{unbounded, Receiver};
use wavedeck_engine::{AudioEngine, EngineEvent, EventKind, ListenerId};

use crate::AudioSource;

pub struct EngineBinding<E: AudioEngine> {
    engine: E,
    source: AudioSource,
    listeners: Vec<(EventKind, ListenerId)>,
    events: Receiver<EngineEvent>,
}

impl<E: AudioEngine> EngineBinding<E> {
    /// 订阅 `kinds` 中的事件后加载音频源
    ///
    /// 先订阅再加载，引擎在加载过程中触发的事件不会丢失。
    pub fn bind(mut engine: E, source: AudioSource, kinds: &[EventKind]) -> Self {
        let (tx, events) = unbounded();

        let listeners = kinds
            .iter()
            .map(|&kind| (kind, engine.on(kind, tx.clone())))
            .collect();

        engine.load(source.as_str());
        tracing::debug!(%source, "engine bound");

        Self {
            engine,
            source,
            listeners,
            events,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// 已注册的监听者
    pub fn listeners(&self) -> &[(EventKind, ListenerId)] {
        &self.listeners
    }

    /// 取出下一个待处理事件（按引擎触发顺序）
    pub fn try_next_event(&self) -> Option<EngineEvent> {
        self.events.try_recv().ok()
    }
}

impl<E: AudioEngine> Drop for EngineBinding<E> {
    fn drop(&mut self) {
        for (kind, id) in self.listeners.drain(..) {
            if !self.engine.un(kind, id) {
                tracing::debug!(%kind, id = id.0, "listener already removed");
            }
        }
        self.engine.destroy();
        tracing::debug!(source = %self.source, "engine released");
    }
}
