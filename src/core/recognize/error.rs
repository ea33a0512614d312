use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("OCR 引擎错误: {0}")]
    Ocr(String),
    #[error("语音识别引擎错误: {0}")]
    Speech(String),
    #[error("音轨提取失败: {0}")]
    AudioExtract(String),
    #[error("WAV 格式错误: {0}")]
    Wav(#[from] hound::Error),
    #[error("重采样失败: {0}")]
    Resample(String),
}
