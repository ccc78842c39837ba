//! 本地引擎
//!
//! 界面线程持有 `NativeEngine`，解码和输出在独立的工作线程中进行。
//! 两边通过命令通道和共享的遥测数据通信。

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::worker::{spawn_worker, WorkerSettings};
use crate::{
    AudioEngine, EngineCommand, EngineError, EngineEvent, EngineFactory, EventKind, ListenerId,
    WaveformOptions,
};

/// 创建 `NativeEngine` 的工厂
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngineFactory;

impl EngineFactory for NativeEngineFactory {
    type Engine = NativeEngine;

    fn create(&mut self, options: &WaveformOptions) -> Result<NativeEngine, EngineError> {
        NativeEngine::new(options)
    }
}

/// 把音频源字符串解析为本地路径，只接受普通路径和 `file://` URL
///
/// URL 的主机部分只能为空或 `localhost`，路径中的 `%XX` 会被解码。
pub fn resolve_source(source: &str) -> Result<PathBuf, EngineError> {
    let unsupported = || EngineError::UnsupportedSource(source.to_string());

    if let Some(rest) = source.strip_prefix("file://") {
        let path = match rest.find('/') {
            Some(0) => rest,
            Some(slash) if rest[..slash].eq_ignore_ascii_case("localhost") => &rest[slash..],
            _ => return Err(unsupported()),
        };
        return percent_decode(path).map(PathBuf::from).ok_or_else(unsupported);
    }
    if source.is_empty() || source.contains("://") {
        return Err(unsupported());
    }
    Ok(PathBuf::from(source))
}

/// 解码 `%XX` 转义，结果不是合法 UTF-8 或转义不完整时返回 `None`
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

struct Listener {
    id: ListenerId,
    kind: EventKind,
    handler: Sender<EngineEvent>,
}

/// 两个线程共享的状态
pub(crate) struct Shared {
    listeners: Mutex<Vec<Listener>>,
    peaks: Mutex<Vec<f32>>,
    volume: AtomicU64,
    duration: AtomicU64,
    current_time: AtomicU64,
    playing: AtomicBool,
    destroyed: AtomicBool,
    /// 每次 `load` 加一，工作线程据此放弃过时的加载
    load_generation: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            peaks: Mutex::new(Vec::new()),
            volume: AtomicU64::new(1.0f64.to_bits()),
            duration: AtomicU64::new(0.0f64.to_bits()),
            current_time: AtomicU64::new(0.0f64.to_bits()),
            playing: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            load_generation: AtomicU64::new(0),
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 按注册顺序把事件发给订阅了该类型的监听者，销毁后不再发送
    pub(crate) fn emit(&self, event: EngineEvent) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }

        let kind = event.kind();
        for listener in self.listeners().iter().filter(|l| l.kind == kind) {
            match listener.handler.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(%kind, id = listener.id.0, "listener channel full, event dropped");
                }
            }
        }
    }

    /// 引擎已销毁，或之后又发起了新的加载
    pub(crate) fn is_stale(&self, generation: u64) -> bool {
        self.destroyed.load(Ordering::Acquire)
            || self.load_generation.load(Ordering::Acquire) != generation
    }

    pub(crate) fn set_volume(&self, volume: f32) {
        self.volume.store((volume as f64).to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_duration(&self, secs: f64) {
        self.duration.store(secs.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_current_time(&self, secs: f64) {
        self.current_time.store(secs.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    pub(crate) fn set_peaks(&self, peaks: Vec<f32>) {
        *self.peaks.lock().unwrap_or_else(PoisonError::into_inner) = peaks;
    }
}

/// 基于 symphonia + cpal 的引擎实例
pub struct NativeEngine {
    shared: Arc<Shared>,
    cmd_tx: Sender<EngineCommand>,
    worker: Option<JoinHandle<()>>,
    next_listener: u64,
}

impl NativeEngine {
    pub fn new(options: &WaveformOptions) -> Result<Self, EngineError> {
        let shared = Arc::new(Shared::new());
        let settings = WorkerSettings {
            peak_buckets: options.peak_buckets,
            normalize: options.normalize,
        };

        let (cmd_tx, worker) = spawn_worker(shared.clone(), settings)?;
        tracing::debug!(container = %options.container, "native engine created");

        Ok(Self {
            shared,
            cmd_tx,
            worker: Some(worker),
            next_listener: 0,
        })
    }

    fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::debug!("engine worker already stopped");
        }
    }

    fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }
}

impl AudioEngine for NativeEngine {
    fn load(&mut self, source: &str) {
        self.shared.set_current_time(0.0);
        let generation = self.shared.load_generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.send_command(EngineCommand::Load {
            source: source.to_string(),
            generation,
        });
    }

    fn play_pause(&mut self) {
        self.send_command(EngineCommand::PlayPause);
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.shared.set_volume(volume);
        self.send_command(EngineCommand::SetVolume(volume));
    }

    fn volume(&self) -> f32 {
        f64::from_bits(self.shared.volume.load(Ordering::Relaxed)) as f32
    }

    fn duration(&self) -> f64 {
        f64::from_bits(self.shared.duration.load(Ordering::Relaxed))
    }

    fn current_time(&self) -> f64 {
        f64::from_bits(self.shared.current_time.load(Ordering::Relaxed))
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    fn peaks(&self) -> Vec<f32> {
        self.shared
            .peaks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn on(&mut self, kind: EventKind, handler: Sender<EngineEvent>) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        if !self.is_destroyed() {
            self.shared.listeners().push(Listener { id, kind, handler });
        }
        id
    }

    fn un(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners();
        let before = listeners.len();
        listeners.retain(|l| !(l.id == id && l.kind == kind));
        listeners.len() != before
    }

    fn destroy(&mut self) {
        if self.shared.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.listeners().clear();
        self.send_command(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("engine worker panicked");
            }
        }
        tracing::debug!("native engine destroyed");
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}
