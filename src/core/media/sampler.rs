//! 视频帧采样器
//!
//! 策略：取首帧；若视频多于一帧，再取末帧，且仅在与首帧逐像素不同时保留，
//! 避免对近似静止的片段做重复 OCR。

use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use log::debug;
use tempfile::NamedTempFile;

use super::MediaError;

/// 已打开的视频容器，按帧号随机解码
pub trait VideoDecoder {
    fn frame_count(&self) -> u64;
    fn decode_frame(&mut self, index: u64) -> Result<RgbaImage, MediaError>;
}

/// 容器解封装边界（黑盒，可在测试中替换）
pub trait VideoOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoDecoder>, MediaError>;
}

pub struct FrameSampler<'a> {
    opener: &'a dyn VideoOpener,
}

impl<'a> FrameSampler<'a> {
    pub fn new(opener: &'a dyn VideoOpener) -> Self {
        Self { opener }
    }

    /// 把视频字节落盘成可 seek 的临时文件并打开容器。
    /// 容器打不开或没有任何帧属于调用方可见的错误（说明媒体损坏/不支持）。
    pub fn sample(&self, video: &[u8]) -> Result<SampledFrames, MediaError> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(video)?;
        tmp.flush()?;

        let decoder = self.opener.open(tmp.path())?;
        if decoder.frame_count() == 0 {
            return Err(MediaError::NoFrames);
        }
        debug!(
            "🎬 Sampling video: {} bytes, {} frames",
            video.len(),
            decoder.frame_count()
        );

        Ok(SampledFrames {
            // 临时文件随迭代器一起析构，任何退出路径都会删除
            _materialized: tmp,
            decoder,
            stage: Stage::First,
            first_pixels: None,
        })
    }
}

enum Stage {
    First,
    Last,
    Done,
}

/// 惰性、有限、不可重启的帧序列
pub struct SampledFrames {
    _materialized: NamedTempFile,
    decoder: Box<dyn VideoDecoder>,
    stage: Stage,
    first_pixels: Option<Vec<u8>>,
}

impl Iterator for SampledFrames {
    type Item = Result<RgbaImage, MediaError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stage {
            Stage::First => match self.decoder.decode_frame(0) {
                Ok(frame) => {
                    self.stage = if self.decoder.frame_count() > 1 {
                        Stage::Last
                    } else {
                        Stage::Done
                    };
                    self.first_pixels = Some(frame.as_raw().clone());
                    Some(Ok(frame))
                }
                Err(e) => {
                    self.stage = Stage::Done;
                    Some(Err(e))
                }
            },
            Stage::Last => {
                self.stage = Stage::Done;
                let last = self.decoder.frame_count() - 1;
                match self.decoder.decode_frame(last) {
                    Ok(frame) => {
                        if self.first_pixels.as_deref() == Some(frame.as_raw().as_slice()) {
                            None
                        } else {
                            Some(Ok(frame))
                        }
                    }
                    Err(e) => Some(Err(e)),
                }
            }
            Stage::Done => None,
        }
    }
}

/// 测试/集成用的内存解码器
pub struct MockVideoOpener {
    frames: Vec<RgbaImage>,
    fail_open: bool,
}

impl MockVideoOpener {
    pub fn with_frames(frames: Vec<RgbaImage>) -> Self {
        Self {
            frames,
            fail_open: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            frames: Vec::new(),
            fail_open: true,
        }
    }
}

impl VideoOpener for MockVideoOpener {
    fn open(&self, _path: &Path) -> Result<Box<dyn VideoDecoder>, MediaError> {
        if self.fail_open {
            return Err(MediaError::Container("mock: unsupported container".into()));
        }
        Ok(Box::new(MockVideoDecoder {
            frames: self.frames.clone(),
        }))
    }
}

struct MockVideoDecoder {
    frames: Vec<RgbaImage>,
}

impl VideoDecoder for MockVideoDecoder {
    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn decode_frame(&mut self, index: u64) -> Result<RgbaImage, MediaError> {
        self.frames
            .get(index as usize)
            .cloned()
            .ok_or_else(|| MediaError::Frame(format!("帧 {} 不存在", index)))
    }
}
