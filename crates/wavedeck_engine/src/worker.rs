//! 引擎工作线程

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::native::{resolve_source, Shared};
use crate::{
    AudioDecoder, AudioOutput, EngineCommand, EngineError, EngineEvent, OutputConfig,
    WaveformPeaks,
};

/// 进度事件间隔
const POSITION_INTERVAL: Duration = Duration::from_millis(100);

/// 输出缓冲区大小
const OUTPUT_BUFFER_FRAMES: usize = 8192;

/// 空闲时等待命令的最长时间
const TICK: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSettings {
    pub peak_buckets: usize,
    pub normalize: bool,
}

/// 启动工作线程，返回命令发送端和线程句柄
///
/// 命令通道不设上限，调用方发送命令永远不会阻塞。
pub(crate) fn spawn_worker(
    shared: Arc<Shared>,
    settings: WorkerSettings,
) -> Result<(Sender<EngineCommand>, JoinHandle<()>), EngineError> {
    let (cmd_tx, cmd_rx) = unbounded();

    let handle = thread::Builder::new()
        .name("wavedeck-engine".to_string())
        .spawn(move || run_worker(cmd_rx, shared, settings))?;

    Ok((cmd_tx, handle))
}

fn run_worker(cmd_rx: Receiver<EngineCommand>, shared: Arc<Shared>, settings: WorkerSettings) {
    let mut state = WorkerState::new(shared, settings);

    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(cmd) => {
                if !state.handle_command(cmd) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if state.playing {
            state.decode_and_play();
            state.update_position();
        }
    }

    state.stop_output();
}

struct WorkerState {
    shared: Arc<Shared>,
    settings: WorkerSettings,
    track: Option<LoadedTrack>,
    playing: bool,
    volume: f32,
    last_position_update: Instant,
}

struct LoadedTrack {
    path: PathBuf,
    decoder: AudioDecoder,
    /// 首次播放时才打开，加载阶段不需要输出设备
    output: Option<AudioOutput>,
    /// 解码器已读到结尾，等待输出缓冲播放完
    drained: bool,
}

impl WorkerState {
    fn new(shared: Arc<Shared>, settings: WorkerSettings) -> Self {
        Self {
            shared,
            settings,
            track: None,
            playing: false,
            volume: 1.0,
            last_position_update: Instant::now(),
        }
    }

    fn handle_command(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::Load { source, generation } => self.load(&source, generation),
            EngineCommand::PlayPause => self.play_pause(),
            EngineCommand::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
            }
            EngineCommand::Shutdown => return false,
        }
        true
    }

    fn fail(&self, message: String) {
        tracing::warn!("{}", message);
        self.shared.emit(EngineEvent::Error(message));
    }

    fn load(&mut self, source: &str, generation: u64) {
        self.stop_output();
        self.track = None;
        self.set_playing(false);
        self.shared.set_current_time(0.0);

        match self.open_track(source, generation) {
            Ok(Some((track, peaks))) => {
                let duration = track
                    .decoder
                    .info
                    .duration
                    .unwrap_or_else(|| peaks.duration());

                tracing::debug!(
                    path = %track.path.display(),
                    codec = %track.decoder.info.codec,
                    duration = duration.as_secs_f64(),
                    "track loaded"
                );

                self.shared.set_duration(duration.as_secs_f64());
                self.shared.set_peaks(peaks.peaks);
                self.track = Some(track);
                self.shared.emit(EngineEvent::Ready);
            }
            Ok(None) => {
                tracing::debug!(source, generation, "load abandoned");
            }
            Err(e) => {
                self.shared.set_duration(0.0);
                self.shared.set_peaks(Vec::new());
                self.fail(format!("Failed to load {}: {}", source, e));
            }
        }
    }

    /// 先完整扫描一遍计算峰值，再为播放重新打开解码器
    ///
    /// 扫描途中引擎被销毁或有更新的加载时返回 `None`。
    fn open_track(
        &self,
        source: &str,
        generation: u64,
    ) -> Result<Option<(LoadedTrack, WaveformPeaks)>, EngineError> {
        let path = resolve_source(source)?;

        let mut scanner = AudioDecoder::open(&path)?;
        let shared = &self.shared;
        let Some(peaks) = WaveformPeaks::scan(
            &mut scanner,
            self.settings.peak_buckets,
            self.settings.normalize,
            || shared.is_stale(generation),
        )?
        else {
            return Ok(None);
        };

        if shared.is_stale(generation) {
            return Ok(None);
        }
        let decoder = AudioDecoder::open(&path)?;

        Ok(Some((
            LoadedTrack {
                path,
                decoder,
                output: None,
                drained: false,
            },
            peaks,
        )))
    }

    fn play_pause(&mut self) {
        let Some(track) = &mut self.track else {
            return;
        };

        if self.playing {
            if let Some(output) = &track.output {
                output.set_playing(false);
            }
            self.set_playing(false);
            return;
        }

        if track.output.is_none() {
            let config = OutputConfig {
                sample_rate: track.decoder.info.sample_rate,
                channels: track.decoder.info.channels as u16,
                buffer_size: OUTPUT_BUFFER_FRAMES,
            };
            match AudioOutput::new(config) {
                Ok(output) => track.output = Some(output),
                Err(e) => {
                    self.fail(format!("Audio output error: {}", e));
                    return;
                }
            }
        }

        if let Some(output) = &track.output {
            output.set_playing(true);
        }
        self.last_position_update = Instant::now();
        self.set_playing(true);
    }

    fn decode_and_play(&mut self) {
        let Some(track) = &mut self.track else {
            return;
        };
        let Some(output) = &track.output else {
            return;
        };

        let mut error = None;
        while !track.drained && !output.is_full() {
            match track.decoder.decode_next() {
                Ok(Some(mut samples)) => {
                    for sample in &mut samples {
                        *sample *= self.volume;
                    }
                    output.write(&samples);
                }
                Ok(None) => track.drained = true,
                Err(e) => {
                    error = Some(format!("Decode error: {}", e));
                    track.drained = true;
                }
            }
        }

        let finished = track.drained && output.is_empty();

        if let Some(message) = error {
            self.fail(message);
        }
        if finished {
            self.finish();
        }
    }

    /// 播放到结尾：暂停并回到开头，下次播放从头开始
    fn finish(&mut self) {
        if let Some(track) = &mut self.track {
            if let Some(output) = &track.output {
                output.set_playing(false);
                output.reset();
            }
            if let Err(e) = track.decoder.seek(Duration::ZERO) {
                tracing::warn!("rewind failed: {}", e);
            }
            track.drained = false;
        }

        self.set_playing(false);
        self.shared.set_current_time(0.0);
        self.shared.emit(EngineEvent::Finished);
    }

    fn update_position(&mut self) {
        if !self.playing || self.last_position_update.elapsed() < POSITION_INTERVAL {
            return;
        }

        if let Some(output) = self.track.as_ref().and_then(|t| t.output.as_ref()) {
            self.shared.set_current_time(output.position());
            self.shared.emit(EngineEvent::TimeUpdate);
        }
        self.last_position_update = Instant::now();
    }

    fn stop_output(&mut self) {
        if let Some(output) = self.track.as_ref().and_then(|t| t.output.as_ref()) {
            output.set_playing(false);
        }
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.shared.set_playing(playing);
    }
}
