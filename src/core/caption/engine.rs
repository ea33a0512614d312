//! 按记录生成候选配文并写回

use std::time::Duration;

use log::{debug, error, info};
use thiserror::Error;

use crate::core::fetch::{FetchError, MediaFetcher};
use crate::core::media::{FrameSampler, MediaError, VideoOpener};
use crate::core::recognize::{FragmentOutcome, RecognitionAdapter};
use crate::models::{MediaType, PostRecord};

use super::{decision, merge};

/// 单条记录层面的失败：下载失败或视频容器损坏。
/// 片段级的识别失败不会走到这里，它们在生成阶段就被跳过了。
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("媒体下载失败: {0}")]
    Fetch(#[from] FetchError),
    #[error("视频处理失败: {0}")]
    Media(#[from] MediaError),
}

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 配文引擎。识别器、下载器、视频解封装全部显式注入，不持有任何全局单例。
pub struct CaptionEngine {
    fetcher: Box<dyn MediaFetcher>,
    adapter: RecognitionAdapter,
    opener: Box<dyn VideoOpener>,
    fetch_timeout: Duration,
}

impl CaptionEngine {
    pub fn new(
        fetcher: Box<dyn MediaFetcher>,
        adapter: RecognitionAdapter,
        opener: Box<dyn VideoOpener>,
    ) -> Self {
        Self {
            fetcher,
            adapter,
            opener,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// 处理一条记录：先算完所有候选，再统一写回。
    /// 返回记录是否被更新。出错时记录保持原样。
    pub fn process_target_post(
        &self,
        record: &mut PostRecord,
        force: bool,
    ) -> Result<bool, ProcessError> {
        let run_ocr = decision::should_run_ocr(
            record.media_caption.as_deref(),
            record.identity_marker().as_deref(),
            &record.media_urls,
            force,
        );

        let wants_audio = Self::wants_audio_caption(record, force);

        // 可播放视频只下载一次，画面 OCR 和语音转写共用同一份字节
        let video_bytes = if Self::is_playable_video(record) && (run_ocr || wants_audio) {
            Some(self.fetcher.fetch(&record.media_urls[1], self.fetch_timeout)?)
        } else {
            None
        };

        let media_candidate = if run_ocr {
            self.generate_media_caption(record, video_bytes.as_deref())?
        } else {
            debug!("⏭️ {}: 无需重跑 OCR", record.ident());
            String::new()
        };

        let audio_candidate = if wants_audio {
            self.generate_audio_caption(record, video_bytes.as_deref())?
        } else {
            None
        };

        let mut updated = false;
        updated |= Self::apply_caption(&mut record.media_caption, &media_candidate);
        if let Some(candidate) = audio_candidate {
            updated |= Self::apply_caption(&mut record.audio_caption, &candidate);
        }

        Ok(updated)
    }

    /// 合并候选并写回字段；字段从未存在且有非空选中值时也写入
    /// （幂等的首写保护）
    fn apply_caption(field: &mut Option<String>, candidate: &str) -> bool {
        let existing = field.clone();
        let (chosen, replaced) = merge::choose_media_caption(existing.as_deref().unwrap_or(""), candidate);

        if replaced {
            *field = Some(chosen);
            return true;
        }
        if existing.is_none() && !chosen.is_empty() {
            *field = Some(chosen);
            return true;
        }
        false
    }

    fn is_playable_video(record: &PostRecord) -> bool {
        record.media_type() == MediaType::Video && record.media_urls.len() >= 2
    }

    fn wants_audio_caption(record: &PostRecord, force: bool) -> bool {
        if !Self::is_playable_video(record) {
            return false;
        }
        let has_audio_caption = record
            .audio_caption
            .as_deref()
            .map_or(false, |c| !c.trim().is_empty());
        !has_audio_caption || force
    }

    /// 按媒体类型生成候选配文。
    /// 片段级识别失败只记日志并跳过，绝不中断剩余片段。
    /// `video` 为已下载的可播放视频字节；传 `None` 时按需下载。
    pub fn generate_media_caption(
        &self,
        record: &PostRecord,
        video: Option<&[u8]>,
    ) -> Result<String, ProcessError> {
        let ident = record.ident();
        let mut parts: Vec<String> = Vec::new();

        match record.media_type() {
            MediaType::Image | MediaType::MultiImage => {
                for url in &record.media_urls {
                    let bytes = self.fetcher.fetch(url, self.fetch_timeout)?;
                    Self::collect_fragment(&mut parts, self.adapter.ocr_fragment(&bytes), &ident);
                }
            }
            MediaType::Video if record.media_urls.len() >= 2 => {
                // URL[0] 是封面图，URL[1] 是可播放视频
                let thumb = self.fetcher.fetch(&record.media_urls[0], self.fetch_timeout)?;
                Self::collect_fragment(&mut parts, self.adapter.ocr_fragment(&thumb), &ident);

                let fetched;
                let video = match video {
                    Some(bytes) => bytes,
                    None => {
                        fetched = self.fetcher.fetch(&record.media_urls[1], self.fetch_timeout)?;
                        &fetched
                    }
                };
                self.ocr_video_frames(&mut parts, video, &ident)?;
            }
            _ => {}
        }

        Ok(parts.join("\n"))
    }

    /// 采样并识别视频帧。部分帧解码失败只跳过该帧；
    /// 一帧都解不出来说明媒体损坏，按记录级错误上抛。
    fn ocr_video_frames(
        &self,
        parts: &mut Vec<String>,
        video: &[u8],
        ident: &str,
    ) -> Result<(), ProcessError> {
        let sampler = FrameSampler::new(self.opener.as_ref());
        let mut decoded = 0usize;
        let mut first_failure: Option<MediaError> = None;

        for frame in sampler.sample(video)? {
            match frame {
                Ok(raster) => {
                    decoded += 1;
                    let dynamic = image::DynamicImage::ImageRgba8(raster);
                    Self::collect_fragment(parts, self.adapter.ocr_raster(&dynamic), ident);
                }
                Err(e) => {
                    error!("❌ {}: 帧解码失败: {}", ident, e);
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        match first_failure {
            Some(e) if decoded == 0 => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn collect_fragment(parts: &mut Vec<String>, outcome: FragmentOutcome, ident: &str) {
        match outcome {
            FragmentOutcome::Text(text) if !text.trim().is_empty() => parts.push(text),
            FragmentOutcome::Text(_) => {}
            FragmentOutcome::Skipped(reason) => debug!("⏭️ {}: 片段跳过: {}", ident, reason),
            FragmentOutcome::Failed(cause) => error!("❌ {}: 片段识别失败: {}", ident, cause),
        }
    }

    /// 视频记录的语音转写候选，只在 [`Self::wants_audio_caption`] 通过后调用
    fn generate_audio_caption(
        &self,
        record: &PostRecord,
        video: Option<&[u8]>,
    ) -> Result<Option<String>, ProcessError> {
        let fetched;
        let video = match video {
            Some(bytes) => bytes,
            None => {
                fetched = self.fetcher.fetch(&record.media_urls[1], self.fetch_timeout)?;
                &fetched
            }
        };
        match self.adapter.transcribe_audio(video) {
            Some((text, loudness)) => {
                info!(
                    "🎙️ {}: 语音转写 {} 字{}",
                    record.ident(),
                    text.chars().count(),
                    loudness
                        .map(|db| format!("，响度 {:.1} dB", db))
                        .unwrap_or_default()
                );
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}
