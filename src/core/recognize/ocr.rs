//! OCR 引擎边界

use image::GrayImage;

use super::error::RecognizeError;

/// 过滤低置信 token 的阈值
pub const MIN_TOKEN_CONFIDENCE: f32 = 0.5;

/// 单个识别出的文本片段及其置信度
#[derive(Debug, Clone)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f32,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// OCR 引擎黑盒：灰度图 → token 列表
pub trait OcrEngine {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrToken>, RecognizeError>;
}

/// 按置信度过滤后拼接
pub fn join_tokens(tokens: &[OcrToken]) -> String {
    tokens
        .iter()
        .filter(|t| t.confidence >= MIN_TOKEN_CONFIDENCE && !t.text.trim().is_empty())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 测试用 OCR 引擎：按调用顺序吐出预置结果，脚本耗尽后重复最后一项
pub struct MockOcrEngine {
    script: Vec<Result<Vec<OcrToken>, String>>,
    cursor: std::sync::Mutex<usize>,
}

impl MockOcrEngine {
    pub fn with_text(text: &str) -> Self {
        Self::with_script(vec![Ok(vec![OcrToken::new(text, 1.0)])])
    }

    pub fn with_texts(texts: &[&str]) -> Self {
        Self::with_script(
            texts
                .iter()
                .map(|t| Ok(vec![OcrToken::new(*t, 1.0)]))
                .collect(),
        )
    }

    pub fn with_tokens(tokens: Vec<OcrToken>) -> Self {
        Self::with_script(vec![Ok(tokens)])
    }

    pub fn failing(cause: &str) -> Self {
        Self::with_script(vec![Err(cause.to_string())])
    }

    pub fn with_script(script: Vec<Result<Vec<OcrToken>, String>>) -> Self {
        Self {
            script,
            cursor: std::sync::Mutex::new(0),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image: &GrayImage) -> Result<Vec<OcrToken>, RecognizeError> {
        let mut cursor = self.cursor.lock().unwrap();
        let index = (*cursor).min(self.script.len().saturating_sub(1));
        *cursor += 1;
        match &self.script[index] {
            Ok(tokens) => Ok(tokens.clone()),
            Err(cause) => Err(RecognizeError::Ocr(cause.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_tokens_filters_low_confidence() {
        let tokens = vec![
            OcrToken::new("清晰", 0.9),
            OcrToken::new("噪声", 0.3),
            OcrToken::new("可用", 0.5),
        ];
        assert_eq!(join_tokens(&tokens), "清晰 可用");
    }

    #[test]
    fn test_join_tokens_skips_blank_text() {
        let tokens = vec![OcrToken::new("  ", 0.99), OcrToken::new("行", 0.99)];
        assert_eq!(join_tokens(&tokens), "行");
    }

    #[test]
    fn test_mock_script_order() {
        let engine = MockOcrEngine::with_texts(&["一", "二"]);
        let img = GrayImage::new(1, 1);
        assert_eq!(join_tokens(&engine.recognize(&img).unwrap()), "一");
        assert_eq!(join_tokens(&engine.recognize(&img).unwrap()), "二");
        // 脚本耗尽后重复最后一项
        assert_eq!(join_tokens(&engine.recognize(&img).unwrap()), "二");
    }
}
