//! 波形峰值
//!
//! 扫描一遍解码结果，得到固定数量的振幅峰值供界面绘制柱状波形。

use std::time::Duration;

use crate::{AudioDecoder, DecoderError};

/// 每个块包含的帧数，扫描时先按块取峰值再合并到目标数量
const BLOCK_FRAMES: usize = 256;

/// 波形峰值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformPeaks {
    /// 每个桶的最大绝对振幅
    pub peaks: Vec<f32>,
    /// 扫描到的总帧数
    pub frames: u64,
    pub sample_rate: u32,
}

impl WaveformPeaks {
    /// 解码整个文件并计算峰值
    ///
    /// 每解码一个包前调用一次 `cancelled`，返回 `true` 时中止扫描并返回 `None`。
    pub fn scan(
        decoder: &mut AudioDecoder,
        buckets: usize,
        normalize: bool,
        mut cancelled: impl FnMut() -> bool,
    ) -> Result<Option<Self>, DecoderError> {
        let channels = decoder.info.channels.max(1);
        let mut blocks = Vec::new();
        let mut current = 0.0f32;
        let mut in_block = 0usize;
        let mut frames = 0u64;

        loop {
            if cancelled() {
                return Ok(None);
            }
            let Some(samples) = decoder.decode_next()? else {
                break;
            };
            for frame in samples.chunks(channels) {
                let amp = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
                current = current.max(amp);
                in_block += 1;
                frames += 1;
                if in_block == BLOCK_FRAMES {
                    blocks.push(current);
                    current = 0.0;
                    in_block = 0;
                }
            }
        }
        if in_block > 0 {
            blocks.push(current);
        }

        let mut peaks = bucket_peaks(&blocks, buckets);
        if normalize {
            normalize_peaks(&mut peaks);
        }

        Ok(Some(Self {
            peaks,
            frames,
            sample_rate: decoder.info.sample_rate,
        }))
    }

    /// 按扫描到的帧数计算的时长
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }
}

/// 把块峰值合并成 `buckets` 个桶，每个桶取其覆盖范围内的最大值
///
/// 块数少于桶数时原样返回。
pub fn bucket_peaks(blocks: &[f32], buckets: usize) -> Vec<f32> {
    if buckets == 0 || blocks.len() <= buckets {
        return blocks.to_vec();
    }

    (0..buckets)
        .map(|i| {
            let start = i * blocks.len() / buckets;
            let end = ((i + 1) * blocks.len() / buckets).max(start + 1);
            blocks[start..end].iter().copied().fold(0.0, f32::max)
        })
        .collect()
}

/// 按最大峰值缩放到 [0, 1]；全静音时保持不变
pub fn normalize_peaks(peaks: &mut [f32]) {
    let max = peaks.iter().copied().fold(0.0, f32::max);
    if max > 0.0 {
        for peak in peaks.iter_mut() {
            *peak /= max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tests::write_wav;

    #[test]
    fn test_bucket_takes_max() {
        let blocks = [0.1, 0.5, 0.2, 0.9, 0.3, 0.4];
        assert_eq!(bucket_peaks(&blocks, 3), vec![0.5, 0.9, 0.4]);
    }

    #[test]
    fn test_bucket_fewer_blocks_than_buckets() {
        assert_eq!(bucket_peaks(&[0.2, 0.3], 10), vec![0.2, 0.3]);
    }

    #[test]
    fn test_normalize() {
        let mut peaks = vec![0.25, 0.5, 0.125];
        normalize_peaks(&mut peaks);
        assert_eq!(peaks, vec![0.5, 1.0, 0.25]);

        let mut silent = vec![0.0; 4];
        normalize_peaks(&mut silent);
        assert_eq!(silent, vec![0.0; 4]);
    }

    #[test]
    fn test_scan_wav() {
        // 前半段安静，后半段响亮
        let mut samples = vec![1000i16; 4096];
        samples.extend(vec![16000i16; 4096]);
        let file = write_wav(&samples, 8192);

        let mut decoder = AudioDecoder::open(file.path()).unwrap();
        let peaks = WaveformPeaks::scan(&mut decoder, 4, true, || false)
            .unwrap()
            .unwrap();

        assert_eq!(peaks.frames, 8192);
        assert_eq!(peaks.duration(), Duration::from_secs(1));
        assert_eq!(peaks.peaks.len(), 4);
        assert_eq!(peaks.peaks[3], 1.0);
        assert!(peaks.peaks[0] < 0.1);
    }

    #[test]
    fn test_scan_stops_when_cancelled() {
        let file = write_wav(&vec![1000i16; 8192], 8192);
        let mut decoder = AudioDecoder::open(file.path()).unwrap();

        let mut polls = 0;
        let result = WaveformPeaks::scan(&mut decoder, 4, true, || {
            polls += 1;
            polls > 1
        })
        .unwrap();

        assert!(result.is_none());
        assert_eq!(polls, 2);
    }
}
