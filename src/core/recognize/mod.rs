//! 识别适配层
//!
//! 把两个黑盒识别器（图像→文本、音轨→文本）包成统一接口，隔离各自的失败
//! 模式：任何一边失败都不会中断批次里其余候选的处理。

pub mod audio_utils;
pub mod error;
pub mod ocr;
pub mod speech;

use image::{DynamicImage, GrayImage};
use log::{debug, error, info};

use crate::core::media::preprocess;

pub use error::RecognizeError;
pub use ocr::{join_tokens, MockOcrEngine, OcrEngine, OcrToken, MIN_TOKEN_CONFIDENCE};
pub use speech::{AudioExtractor, MockAudioExtractor, MockSpeechEngine, SpeechEngine};

/// 响度统计的帧长（16 kHz 下约 128 ms）
const LOUDNESS_FRAME_LEN: usize = 2048;

/// 单个媒体片段的识别结果，显式区分跳过与失败
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentOutcome {
    Text(String),
    Skipped(String),
    Failed(String),
}

pub struct RecognitionAdapter {
    ocr: Box<dyn OcrEngine>,
    speech: Box<dyn SpeechEngine>,
    audio: Box<dyn AudioExtractor>,
}

impl RecognitionAdapter {
    pub fn new(
        ocr: Box<dyn OcrEngine>,
        speech: Box<dyn SpeechEngine>,
        audio: Box<dyn AudioExtractor>,
    ) -> Self {
        Self { ocr, speech, audio }
    }

    /// 识别灰度图上的文字。引擎失败时记录原因并返回空文本，从不报错。
    pub fn recognize_text(&self, image: &GrayImage) -> String {
        match self.ocr.recognize(image) {
            Ok(tokens) => join_tokens(&tokens),
            Err(e) => {
                error!("❌ OCR 引擎失败: {}", e);
                String::new()
            }
        }
    }

    /// 对一段图像字节做 预处理 + OCR
    pub fn ocr_fragment(&self, bytes: &[u8]) -> FragmentOutcome {
        let gray = match preprocess::prepare_bytes(bytes) {
            Ok(gray) => gray,
            Err(e) => return FragmentOutcome::Skipped(format!("图像解码失败: {}", e)),
        };
        self.ocr_gray(&gray)
    }

    /// 对已解码的帧做 预处理 + OCR
    pub fn ocr_raster(&self, raster: &DynamicImage) -> FragmentOutcome {
        self.ocr_gray(&preprocess::prepare_raster(raster))
    }

    fn ocr_gray(&self, gray: &GrayImage) -> FragmentOutcome {
        match self.ocr.recognize(gray) {
            Ok(tokens) => FragmentOutcome::Text(join_tokens(&tokens)),
            Err(e) => FragmentOutcome::Failed(e.to_string()),
        }
    }

    /// 转写视频音轨。返回 `None` 表示本片段被跳过：
    /// 无音轨是预期情况（debug 级），其余运行时失败记 error 后跳过。
    /// 响度（逐帧 RMS 均值，dB）仅作诊断。
    pub fn transcribe_audio(&self, video: &[u8]) -> Option<(String, Option<f32>)> {
        let wav = match self.audio.extract_wav(video) {
            Ok(Some(wav)) => wav,
            Ok(None) => {
                debug!("🔇 视频没有音轨，跳过语音转写");
                return None;
            }
            Err(e) => {
                error!("❌ 音轨提取失败: {}", e);
                return None;
            }
        };

        match self.transcribe_wav(&wav) {
            Ok((text, loudness)) => {
                if let Some(db) = loudness {
                    info!("🔊 平均响度 {:.1} dB", db);
                }
                Some((text, loudness))
            }
            Err(e) => {
                error!("❌ 语音转写失败: {}", e);
                None
            }
        }
    }

    fn transcribe_wav(&self, wav: &[u8]) -> Result<(String, Option<f32>), RecognizeError> {
        let (samples, rate) = audio_utils::load_wav_mono_f32(wav)?;
        let loudness = audio_utils::mean_rms_db(&samples, LOUDNESS_FRAME_LEN);

        let pcm_16k = if rate == 16_000 {
            samples
        } else {
            audio_utils::resample_to_16k_mono(&samples, rate)?
        };

        let text = self.speech.transcribe(&pcm_16k, 16_000)?;
        Ok((text, loudness))
    }
}
