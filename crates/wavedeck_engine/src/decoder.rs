//! 音频解码器
//!
//! 使用 symphonia 解码音频文件

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

/// 解码器错误
#[derive(thiserror::Error, Debug)]
pub enum DecoderError {
    #[error("No supported audio track found")]
    NoTrack,
    #[error("Unsupported codec")]
    UnsupportedCodec,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SymphoniaError> for DecoderError {
    fn from(e: SymphoniaError) -> Self {
        DecoderError::Decode(e.to_string())
    }
}

/// 音频信息
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration: Option<Duration>,
    pub codec: String,
}

/// 音频解码器
pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_buf: Option<SampleBuffer<f32>>,
    pub info: AudioInfo,
}

impl AudioDecoder {
    /// 打开本地音频文件，扩展名作为格式提示
    pub fn open(path: &Path) -> Result<Self, DecoderError> {
        let stream = MediaSourceStream::new(Box::new(File::open(path)?), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )?
            .format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecoderError::NoTrack)?;
        let track_id = track.id;
        let info = AudioInfo::from_params(&track.codec_params);
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|_| DecoderError::UnsupportedCodec)?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_buf: None,
            info,
        })
    }

    /// 解码下一段音频，返回交错排列的 f32 采样；`None` 表示文件结束
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>, DecoderError> {
        while let Some(packet) = self.next_packet()? {
            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let frames = decoded.capacity();
                    let needed = frames * spec.channels.count();
                    if self.sample_buf.as_ref().is_some_and(|b| b.capacity() < needed) {
                        self.sample_buf = None;
                    }
                    let buf = self
                        .sample_buf
                        .get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
                    buf.copy_interleaved_ref(decoded);
                    return Ok(Some(buf.samples().to_vec()));
                }
                // 损坏的包直接跳过
                Err(SymphoniaError::DecodeError(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// 读取属于当前轨道的下一个包
    fn next_packet(&mut self) -> Result<Option<Packet>, DecoderError> {
        loop {
            match self.format.next_packet() {
                Ok(packet) if packet.track_id() == self.track_id => return Ok(Some(packet)),
                Ok(_) => {}
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 跳转到指定时间
    pub fn seek(&mut self, time: Duration) -> Result<(), DecoderError> {
        self.format.seek(
            SeekMode::Accurate,
            SeekTo::Time {
                time: Time::from(time.as_secs_f64()),
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        Ok(())
    }
}

impl AudioInfo {
    fn from_params(params: &CodecParameters) -> Self {
        let sample_rate = params.sample_rate.unwrap_or(44100);
        Self {
            sample_rate,
            channels: params.channels.map_or(2, |c| c.count()),
            duration: params
                .n_frames
                .map(|frames| Duration::from_secs_f64(frames as f64 / sample_rate as f64)),
            codec: format!("{:?}", params.codec),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// 生成 16-bit PCM 单声道 WAV 文件，内容为指定采样
    pub(crate) fn write_wav(samples: &[i16], sample_rate: u32) -> tempfile::NamedTempFile {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_decode_wav() {
        let samples: Vec<i16> = (0..8000).map(|i| if i % 2 == 0 { 8000 } else { -8000 }).collect();
        let file = write_wav(&samples, 8000);

        let mut decoder = AudioDecoder::open(file.path()).unwrap();
        assert_eq!(decoder.info.sample_rate, 8000);
        assert_eq!(decoder.info.channels, 1);
        assert_eq!(decoder.info.duration, Some(Duration::from_secs(1)));

        let mut total = 0;
        while let Some(chunk) = decoder.decode_next().unwrap() {
            assert!(chunk.iter().all(|s| s.abs() <= 1.0));
            total += chunk.len();
        }
        assert_eq!(total, samples.len());
    }

    #[test]
    fn test_seek_to_start_replays() {
        let samples = vec![1000i16; 4000];
        let file = write_wav(&samples, 8000);

        let mut decoder = AudioDecoder::open(file.path()).unwrap();
        while decoder.decode_next().unwrap().is_some() {}

        decoder.seek(Duration::ZERO).unwrap();
        assert!(decoder.decode_next().unwrap().is_some());
    }

    #[test]
    fn test_open_missing_file() {
        let result = AudioDecoder::open(Path::new("/nonexistent/track.mp3"));
        assert!(matches!(result, Err(DecoderError::Io(_))));
    }
}
