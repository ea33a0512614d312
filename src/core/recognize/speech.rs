//! 语音转写与音轨提取边界

use super::error::RecognizeError;

/// 语音识别黑盒：16 kHz 单声道 f32 → 文本
pub trait SpeechEngine {
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String, RecognizeError>;
}

/// 从视频字节提取音轨为 WAV 字节。
/// `Ok(None)` 表示视频没有音轨（预期情况，静默跳过）。
pub trait AudioExtractor {
    fn extract_wav(&self, video: &[u8]) -> Result<Option<Vec<u8>>, RecognizeError>;
}

/// 测试用语音引擎
pub struct MockSpeechEngine {
    result: Result<String, String>,
}

impl MockSpeechEngine {
    pub fn with_text(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            result: Err(cause.to_string()),
        }
    }
}

impl SpeechEngine for MockSpeechEngine {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> Result<String, RecognizeError> {
        self.result
            .clone()
            .map_err(RecognizeError::Speech)
    }
}

/// 测试用音轨提取器
pub enum MockAudioExtractor {
    /// 固定返回这段 WAV 字节
    Wav(Vec<u8>),
    /// 视频无音轨
    NoTrack,
    /// 运行时失败
    Failing(String),
}

impl AudioExtractor for MockAudioExtractor {
    fn extract_wav(&self, _video: &[u8]) -> Result<Option<Vec<u8>>, RecognizeError> {
        match self {
            MockAudioExtractor::Wav(bytes) => Ok(Some(bytes.clone())),
            MockAudioExtractor::NoTrack => Ok(None),
            MockAudioExtractor::Failing(cause) => {
                Err(RecognizeError::AudioExtract(cause.clone()))
            }
        }
    }
}
