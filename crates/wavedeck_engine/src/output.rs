//! 音频输出
//!
//! 使用 cpal 进行音频播放

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};

/// 音频输出错误
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("No output device available")]
    NoDevice,
    #[error("No supported config")]
    NoConfig,
    #[error("Stream error: {0}")]
    Stream(String),
}

/// 音频输出配置
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_size: usize,
}

/// 音频输出流
pub struct AudioOutput {
    _stream: Stream,
    ring: Arc<RingBuffer>,
    is_playing: Arc<AtomicBool>,
    position_frames: Arc<AtomicU64>,
    sample_rate: u32,
    source_channels: u16,
    device_channels: u16,
}

impl AudioOutput {
    /// 在默认设备上创建音频输出
    pub fn new(config: OutputConfig) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

        Self::with_device(&device, config)
    }

    /// 使用指定设备创建音频输出
    ///
    /// 优先选择声道数一致的配置，否则退而选择任意声道数，写入时再做声道映射。
    pub fn with_device(device: &Device, config: OutputConfig) -> Result<Self, OutputError> {
        let rate_ok = |c: &cpal::SupportedStreamConfigRange| {
            c.min_sample_rate().0 <= config.sample_rate
                && c.max_sample_rate().0 >= config.sample_rate
                && c.sample_format() == SampleFormat::F32
        };

        let configs: Vec<_> = device
            .supported_output_configs()
            .map_err(|e| OutputError::Stream(e.to_string()))?
            .filter(|c| rate_ok(c))
            .collect();

        let supported_config = configs
            .iter()
            .find(|c| c.channels() == config.channels)
            .or_else(|| configs.first())
            .cloned()
            .ok_or(OutputError::NoConfig)?;

        let device_channels = supported_config.channels();
        let stream_config: StreamConfig = supported_config
            .with_sample_rate(cpal::SampleRate(config.sample_rate))
            .into();

        let is_playing = Arc::new(AtomicBool::new(false));
        let position_frames = Arc::new(AtomicU64::new(0));
        let ring = Arc::new(RingBuffer::new(config.buffer_size * 4));

        let is_playing_clone = is_playing.clone();
        let position_clone = position_frames.clone();
        let ring_clone = ring.clone();
        let frame_width = device_channels.max(1) as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if is_playing_clone.load(Ordering::Relaxed) {
                        let read = ring_clone.read(data);
                        data[read..].fill(0.0);
                        position_clone.fetch_add((read / frame_width) as u64, Ordering::Relaxed);
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| {
                    tracing::warn!("audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| OutputError::Stream(e.to_string()))?;

        stream.play().map_err(|e| OutputError::Stream(e.to_string()))?;

        tracing::debug!(
            sample_rate = config.sample_rate,
            source_channels = config.channels,
            device_channels,
            "audio output opened"
        );

        Ok(Self {
            _stream: stream,
            ring,
            is_playing,
            position_frames,
            sample_rate: config.sample_rate,
            source_channels: config.channels,
            device_channels,
        })
    }

    /// 写入交错采样，返回缓冲区是否还有空间继续写
    pub fn write(&self, samples: &[f32]) -> bool {
        if self.source_channels == self.device_channels {
            self.ring.write(samples);
        } else {
            let mapped = remap_channels(samples, self.source_channels, self.device_channels);
            self.ring.write(&mapped);
        }
        !self.ring.is_full()
    }

    /// 缓冲区是否已满（写入方应稍后再试）
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// 缓冲数据是否已全部播放
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn set_playing(&self, playing: bool) {
        self.is_playing.store(playing, Ordering::Relaxed);
    }

    /// 已输出的时长（秒）
    pub fn position(&self) -> f64 {
        let frames = self.position_frames.load(Ordering::Relaxed);
        frames as f64 / self.sample_rate as f64
    }

    /// 丢弃缓冲数据并把位置归零
    pub fn reset(&self) {
        self.ring.clear();
        self.position_frames.store(0, Ordering::Relaxed);
    }
}

/// 在不同声道数之间转换交错采样
///
/// 单声道复制到所有输出声道；多声道到单声道取平均；其余情况按声道序号截断或补零。
pub fn remap_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if from == 1 {
            out.extend(std::iter::repeat(frame[0]).take(to));
        } else if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|ch| frame.get(ch).copied().unwrap_or(0.0)));
        }
    }

    out
}

/// 简单的环形缓冲区
struct RingBuffer {
    buffer: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<f32>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, data: &[f32]) {
        let mut buf = self.lock();
        if data.len() >= self.capacity {
            buf.clear();
            buf.extend(data[data.len() - self.capacity..].iter().copied());
            return;
        }

        // 缓冲区满时丢弃最旧的数据
        let needed = buf.len() + data.len();
        if needed > self.capacity {
            buf.drain(..needed - self.capacity);
        }

        buf.extend(data.iter().copied());
    }

    fn read(&self, output: &mut [f32]) -> usize {
        let mut buf = self.lock();
        let to_read = output.len().min(buf.len());

        for (dst, src) in output.iter_mut().zip(buf.drain(..to_read)) {
            *dst = src;
        }

        to_read
    }

    fn is_full(&self) -> bool {
        // 留出一半空间给下一个解码包
        self.lock().len() >= self.capacity / 2
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
