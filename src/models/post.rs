use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 帖子媒体类型，由原始 `media_type` 字符串推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    /// 单图帖
    Image,
    /// 多图帖
    MultiImage,
    /// 视频帖（URL[0] 为封面图，URL[1] 为可播放视频）
    Video,
    /// 其他（纯文本等，不做识别）
    #[default]
    Other,
}

impl MediaType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "image" => MediaType::Image,
            "multi_image" => MediaType::MultiImage,
            "video" => MediaType::Video,
            _ => MediaType::Other,
        }
    }
}

/// 抓取到的帖子记录
///
/// 快照中的未知字段全部收进 `extra`，持久化时原样写回；
/// 本库只改写 `media_caption` / `audio_caption` 两个字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_num: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_num: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PostRecord {
    /// 稳定标识：优先 shortcode，缺失时退回 p_num
    pub fn ident(&self) -> String {
        if let Some(code) = self.shortcode.as_deref().filter(|s| !s.is_empty()) {
            return code.to_string();
        }
        match &self.p_num {
            Some(Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => "<unknown>".to_string(),
        }
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::parse(&self.media_type)
    }

    /// 身份标记（user_num），仅用于判断 caption 质量
    pub fn identity_marker(&self) -> Option<String> {
        match &self.user_num {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}
